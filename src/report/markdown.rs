//! Markdown building blocks for the executive report

/// Build a markdown table from headers and rows
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    if headers.is_empty() {
        return String::new();
    }

    let mut output = format!("| {} |\n", headers.join(" | "));
    output.push_str(&format!(
        "| {} |\n",
        headers.iter().map(|_| "---").collect::<Vec<_>>().join(" | ")
    ));
    for row in rows {
        let cells: Vec<String> = row.iter().map(|cell| escape_table_cell(cell)).collect();
        output.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    output.push('\n');
    output
}

pub fn heading(level: u8, text: &str) -> String {
    format!("{} {}\n\n", "#".repeat(level as usize), text)
}

pub fn paragraph(text: &str) -> String {
    format!("{}\n\n", text.trim())
}

pub fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}\n"))
        .collect::<String>()
        + "\n"
}

/// Task-list entry, rendered as a checkbox by most viewers
pub fn task_item(label: &str, checked: bool) -> String {
    format!("- [{}] {}\n", if checked { "x" } else { " " }, label)
}

pub fn image(alt: &str, path: &str) -> String {
    format!("![{alt}]({path})\n\n")
}

pub fn bold(text: &str) -> String {
    format!("**{text}**")
}

pub fn rule() -> String {
    "---\n\n".to_string()
}

/// Escape for use within a table cell (only pipe and newlines matter)
pub fn escape_table_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table() {
        let rows = vec![vec!["Upload".to_string(), "a|b".to_string()]];
        let result = table(&["Etapa", "Status"], &rows);
        assert!(result.contains("| Etapa | Status |"));
        assert!(result.contains("| --- | --- |"));
        assert!(result.contains("| Upload | a\\|b |"));
    }

    #[test]
    fn test_heading() {
        assert_eq!(heading(1, "Title"), "# Title\n\n");
        assert_eq!(heading(2, "Sub"), "## Sub\n\n");
    }

    #[test]
    fn test_task_item() {
        assert_eq!(task_item("KPI", true), "- [x] KPI\n");
        assert_eq!(task_item("KPI", false), "- [ ] KPI\n");
    }
}
