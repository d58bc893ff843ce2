//! Prompt templates sent to the model gateway.
//!
//! Prompts are written in Portuguese: the component keyword filter runs on
//! the model's answer, so the answer must come back in the same language.

use crate::types::TARGET_PLATFORM;

/// Visual extraction leans descriptive
pub const EXTRACTION_TEMPERATURE: f32 = 0.3;
/// Analytical tables and scripts stay literal
pub const ANALYSIS_TEMPERATURE: f32 = 0.2;
pub const COMPARISON_TEMPERATURE: f32 = 0.3;

pub fn extraction(origin: &str) -> String {
    format!(
        "Você é um especialista em BI. Analise a imagem de um dashboard do {origin} e extraia \
         os elementos visuais, como gráficos, tabelas, indicadores, KPIs, textos, campos, \
         filtros e menus. Liste um elemento por linha."
    )
}

pub fn compatibility(ocr_text: &str, columns: &str) -> String {
    format!(
        "Você é um consultor de BI. Um dashboard foi extraído visualmente com o seguinte conteúdo:\n\n\
         {ocr_text}\n\n\
         A seguir, temos uma base de dados com estas colunas:\n\
         {columns}\n\n\
         Sua tarefa:\n\
         1. Verifique quais gráficos, KPIs, filtros e tabelas descritos no dashboard podem ser construídos com os dados disponíveis.\n\
         2. Apresente uma tabela listando o nome do componente, os campos correspondentes e se está compatível (Sim/Não).\n\
         3. Quando algum campo não for encontrado, sugira como ele pode ser criado (ex: \"Ticket Médio = receita / quantidade\").\n\
         4. Apresente tudo de forma clara para o analista entender rapidamente o que pode ser implementado e o que falta.\n"
    )
}

pub fn migration_script(origin: &str, ocr_text: &str, columns: &str) -> String {
    format!(
        "Você é um especialista em BI migrando dashboards do {origin} para o {TARGET_PLATFORM}.\n\n\
         Dashboard extraído visualmente:\n\
         {ocr_text}\n\n\
         Base de dados com colunas:\n\
         {columns}\n\n\
         Gere um roteiro completo com:\n\
         1. Conexão da base\n\
         2. Transformações necessárias (Power Query)\n\
         3. Layout visual do dashboard\n\
         4. Tipo de gráficos, eixos, valores e filtros\n\
         5. Interações como drill-down e slicers\n\
         6. Onde e como posicionar os elementos visuais\n\
         7. Recomendações práticas para performance e usabilidade\n"
    )
}

pub fn dax_measures(origin: &str, ocr_text: &str, columns: &str) -> String {
    format!(
        "Você é um especialista em {TARGET_PLATFORM}.\n\n\
         Com base no seguinte dashboard (extraído do {origin}):\n\
         {ocr_text}\n\n\
         E nesta base de dados com colunas:\n\
         {columns}\n\n\
         Gere as principais **medidas DAX** que devem ser criadas no {TARGET_PLATFORM}.\n\n\
         Para cada medida informe:\n\
         - Nome da Medida\n\
         - Fórmula DAX\n\
         - Descrição do que ela faz\n\
         - Onde ela deve ser usada (gráfico, KPI, filtro etc.)\n"
    )
}

pub fn visual_comparison(origin: &str, roteiro: &str) -> String {
    format!(
        "Você é um consultor de BI. Compare as imagens de dois dashboards:\n\n\
         - O primeiro foi gerado no {origin} (imagem 1)\n\
         - O segundo foi recriado no {TARGET_PLATFORM} (imagem 2)\n\n\
         Objetivo:\n\
         1. Verifique se os elementos visuais (gráficos, KPIs, filtros, layout) foram mantidos.\n\
         2. Liste os componentes como \"Compatível\", \"Parcial\" ou \"Incompatível\".\n\
         3. Quando houver discrepâncias, explique o motivo e gere instruções para o analista corrigir no {TARGET_PLATFORM}.\n\
         4. Considere também o roteiro abaixo, que foi usado como base para construir o novo dashboard:\n\n\
         {roteiro}\n\n\
         Responda com uma tabela comparativa seguida das instruções de correção.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_name_origin_platform() {
        assert!(extraction("Tableau").contains("dashboard do Tableau"));
        assert!(migration_script("QlikView", "ocr", "a, b").contains("do QlikView para o Power BI"));
        assert!(dax_measures("Excel", "ocr", "a").contains("extraído do Excel"));
        assert!(visual_comparison("Tableau", "r").contains("gerado no Tableau (imagem 1)"));
    }

    #[test]
    fn test_compatibility_embeds_inputs() {
        let prompt = compatibility("Gráfico de vendas", "data, receita");
        assert!(prompt.contains("Gráfico de vendas"));
        assert!(prompt.contains("data, receita"));
        assert!(prompt.contains("(Sim/Não)"));
    }
}
