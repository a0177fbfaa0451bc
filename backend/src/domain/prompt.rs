//! Deterministic rendering of a schema and question into a model prompt.
//!
//! The prompt has a fixed layout: preamble, schema description, optional
//! context block, the question, then the numbered instruction list ending
//! with the JSON response contract (`sql`, `explanation`, `confidence`).
//! Rendering is a pure function of its inputs.
//!
//! The schema description is produced by [`SchemaDescription`], which is also
//! what [`schema_stats`] measures, so the reported prompt size always matches
//! the emitted text.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::schema::{Column, Schema, Table};

const PREAMBLE: &str = "Você é um especialista em SQL. Com base no schema do banco de dados \
abaixo, gere uma consulta SQL que responda à pergunta do usuário.";

const GENERIC_RULES: [&str; 3] = [
    "Gere apenas SQL válido e otimizado.",
    "Use os nomes exatos das tabelas e colunas do schema.",
    "Inclua JOINs quando necessário.",
];

const DEFAULT_BUSINESS_RULES: [&str; 2] = [
    "Para filtrar de produtos ativados/desativados, utilize a coluna produto.desativado.",
    "Utilize a  coluna produto_empresa_grade.ativo apenas se o usuário especificar que os \
produtos são grade.",
];

const LANGUAGE_RULE: &str = "Retorne a explanation em português.";

const RESPONSE_FORMAT_RULE: &str = "Retorne a resposta no formato JSON:\n{\n  \"sql\": \
\"SELECT ...\",\n  \"explanation\": \"Explicação da query\",\n  \"confidence\": 0.95\n}";

/// Deployment-specific business rules appended to the instruction list.
///
/// The defaults carry the rules of the product catalogue the service was
/// first deployed against; other deployments replace them wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptRules(Vec<String>);

impl PromptRules {
    /// Rules from an explicit list, blank entries dropped.
    pub fn new<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            rules
                .into_iter()
                .map(Into::into)
                .filter(|rule| !rule.trim().is_empty())
                .collect(),
        )
    }

    /// No business rules at all.
    pub fn none() -> Self {
        Self(Vec::new())
    }

    /// The configured rules in order.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Default for PromptRules {
    fn default() -> Self {
        Self::new(DEFAULT_BUSINESS_RULES)
    }
}

/// Schema statistics reported with metrics and the stats endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaStats {
    pub tables: usize,
    pub columns: usize,
    pub relationships: usize,
    /// Characters in the rendered schema description.
    pub prompt_size: usize,
}

/// Compute statistics for `schema`.
///
/// # Examples
/// ```
/// use nl2sql::domain::{Column, Schema, Table, schema_stats};
///
/// let schema = Schema {
///     database_name: "shop".into(),
///     tables: vec![Table::new("orders", vec![Column::new("id", "INT")])],
///     relationships: vec![],
/// };
/// let stats = schema_stats(&schema);
/// assert_eq!((stats.tables, stats.columns, stats.relationships), (1, 1, 0));
/// ```
pub fn schema_stats(schema: &Schema) -> SchemaStats {
    SchemaStats {
        tables: schema.tables.len(),
        columns: schema.column_count(),
        relationships: schema.relationships.len(),
        prompt_size: SchemaDescription(schema).to_string().chars().count(),
    }
}

/// Display adapter rendering the schema description block.
pub struct SchemaDescription<'a>(pub &'a Schema);

impl fmt::Display for SchemaDescription<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let schema = self.0;
        writeln!(f, "Banco de Dados: {}", schema.database_name)?;
        writeln!(f)?;

        for table in &schema.tables {
            write_table(f, table)?;
        }

        if !schema.relationships.is_empty() {
            writeln!(f, "Relacionamentos:")?;
            for rel in &schema.relationships {
                writeln!(f, "  {} -> {} ({})", rel.from, rel.to, rel.kind)?;
            }
        }
        Ok(())
    }
}

fn write_table(f: &mut fmt::Formatter<'_>, table: &Table) -> fmt::Result {
    writeln!(f, "Tabela: {}", table.name)?;
    if let Some(description) = table.description() {
        writeln!(f, "Descrição: {description}")?;
    }
    writeln!(f, "Colunas:")?;
    for column in &table.columns {
        write_column(f, column)?;
    }
    writeln!(f)
}

// Annotation order is fixed: primary key, nullable, foreign key.
fn write_column(f: &mut fmt::Formatter<'_>, column: &Column) -> fmt::Result {
    write!(f, "  - {} ({})", column.name, column.data_type)?;
    if column.primary_key {
        f.write_str(" [PRIMARY KEY]")?;
    }
    if column.nullable {
        f.write_str(" [NULLABLE]")?;
    }
    if let Some(fk) = &column.foreign_key {
        write!(f, " [FK -> {fk}]")?;
    }
    writeln!(f)
}

/// Renders prompts with a fixed set of business rules.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    rules: PromptRules,
}

impl PromptBuilder {
    /// Builder using `rules` as the business-rule block.
    pub fn new(rules: PromptRules) -> Self {
        Self { rules }
    }

    /// Business rules in effect.
    pub fn rules(&self) -> &PromptRules {
        &self.rules
    }

    /// Render the full prompt.
    ///
    /// `question` must be non-blank; callers validate it. An empty `context`
    /// is treated as absent.
    pub fn build(&self, schema: &Schema, question: &str, context: Option<&str>) -> String {
        Prompt {
            rules: &self.rules,
            schema,
            question,
            context: context.filter(|text| !text.is_empty()),
        }
        .to_string()
    }
}

struct Prompt<'a> {
    rules: &'a PromptRules,
    schema: &'a Schema,
    question: &'a str,
    context: Option<&'a str>,
}

impl fmt::Display for Prompt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{PREAMBLE}")?;
        writeln!(f)?;
        writeln!(f, "SCHEMA DO BANCO DE DADOS:")?;
        writeln!(f, "{}", SchemaDescription(self.schema))?;
        writeln!(f)?;
        if let Some(context) = self.context {
            writeln!(f, "CONTEXTO ADICIONAL: {context}")?;
        }
        writeln!(f)?;
        writeln!(f)?;
        writeln!(f, "PERGUNTA DO USUÁRIO: {}", self.question)?;
        writeln!(f)?;
        writeln!(f, "INSTRUÇÕES:")?;

        let rules = GENERIC_RULES
            .iter()
            .copied()
            .chain(self.rules.as_slice().iter().map(String::as_str))
            .chain([LANGUAGE_RULE, RESPONSE_FORMAT_RULE]);
        for (index, rule) in rules.enumerate() {
            writeln!(f, "{}. {rule}", index + 1)?;
        }
        writeln!(f)?;
        f.write_str("SQL:")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::{ColumnRef, Relationship, RelationshipKind};
    use rstest::{fixture, rstest};

    #[fixture]
    fn shop() -> Schema {
        Schema {
            database_name: "shop".to_owned(),
            tables: vec![Table::new("orders", vec![Column::new("id", "INT").primary_key()])],
            relationships: Vec::new(),
        }
    }

    #[fixture]
    fn rich() -> Schema {
        Schema {
            database_name: "erp".to_owned(),
            tables: vec![
                Table::new(
                    "customers",
                    vec![
                        Column::new("id", "INT").primary_key(),
                        Column::new("email", "VARCHAR(255)").nullable(),
                    ],
                )
                .with_description("Registered buyers"),
                Table::new(
                    "orders",
                    vec![
                        Column::new("id", "INT").primary_key(),
                        Column::new("customer_id", "INT")
                            .nullable()
                            .primary_key()
                            .references("customers", "id"),
                    ],
                ),
            ],
            relationships: vec![Relationship::new(
                ColumnRef::new("orders", "customer_id"),
                ColumnRef::new("customers", "id"),
                RelationshipKind::ManyToOne,
            )],
        }
    }

    #[rstest]
    fn schema_description_matches_layout(rich: Schema) {
        let expected = "Banco de Dados: erp\n\n\
Tabela: customers\n\
Descrição: Registered buyers\n\
Colunas:\n  - id (INT) [PRIMARY KEY]\n  - email (VARCHAR(255)) [NULLABLE]\n\n\
Tabela: orders\n\
Colunas:\n  - id (INT) [PRIMARY KEY]\n  - customer_id (INT) [PRIMARY KEY] [NULLABLE] [FK -> customers.id]\n\n\
Relacionamentos:\n  orders.customer_id -> customers.id (many-to-one)\n";
        assert_eq!(SchemaDescription(&rich).to_string(), expected);
    }

    #[rstest]
    fn relationships_section_omitted_when_empty(shop: Schema) {
        assert!(!SchemaDescription(&shop).to_string().contains("Relacionamentos"));
    }

    #[rstest]
    fn prompt_contains_schema_and_question(shop: Schema) {
        let prompt = PromptBuilder::default().build(&shop, "how many orders", None);
        assert!(prompt.contains("Tabela: orders"));
        assert!(prompt.contains("id (INT) [PRIMARY KEY]"));
        assert!(prompt.contains("PERGUNTA DO USUÁRIO: how many orders"));
        assert!(prompt.starts_with(PREAMBLE));
        assert!(prompt.ends_with("SQL:"));
        assert!(!prompt.contains("CONTEXTO ADICIONAL"));
    }

    #[rstest]
    fn prompt_layout_is_exact_without_business_rules(shop: Schema) {
        let prompt = PromptBuilder::new(PromptRules::none()).build(&shop, "q?", Some("ctx"));
        let expected = format!(
            "{PREAMBLE}\n\nSCHEMA DO BANCO DE DADOS:\n\
Banco de Dados: shop\n\nTabela: orders\nColunas:\n  - id (INT) [PRIMARY KEY]\n\n\n\n\
CONTEXTO ADICIONAL: ctx\n\n\n\
PERGUNTA DO USUÁRIO: q?\n\n\
INSTRUÇÕES:\n\
1. Gere apenas SQL válido e otimizado.\n\
2. Use os nomes exatos das tabelas e colunas do schema.\n\
3. Inclua JOINs quando necessário.\n\
4. {LANGUAGE_RULE}\n\
5. {RESPONSE_FORMAT_RULE}\n\nSQL:"
        );
        assert_eq!(prompt, expected);
    }

    #[rstest]
    fn empty_context_is_treated_as_absent(shop: Schema) {
        let prompt = PromptBuilder::default().build(&shop, "q", Some(""));
        assert!(!prompt.contains("CONTEXTO ADICIONAL"));
    }

    #[rstest]
    fn business_rules_are_numbered_after_generic_rules(shop: Schema) {
        let rules = PromptRules::new(["Use COALESCE(data_venda, data_emissao) for sale date.", " "]);
        let prompt = PromptBuilder::new(rules).build(&shop, "q", None);
        assert!(prompt.contains("4. Use COALESCE(data_venda, data_emissao) for sale date.\n"));
        assert!(prompt.contains(&format!("5. {LANGUAGE_RULE}\n")));
        assert!(prompt.contains("6. Retorne a resposta no formato JSON:"));
    }

    #[rstest]
    fn default_rules_reproduce_catalogue_rules(shop: Schema) {
        let prompt = PromptBuilder::default().build(&shop, "q", None);
        assert!(prompt.contains("4. Para filtrar de produtos ativados/desativados"));
        assert!(prompt.contains("5. Utilize a  coluna produto_empresa_grade.ativo"));
        assert!(prompt.contains("7. Retorne a resposta no formato JSON:"));
    }

    #[rstest]
    fn names_appear_in_schema_order(rich: Schema) {
        let prompt = PromptBuilder::default().build(&rich, "q", None);
        let customers = prompt.find("Tabela: customers").expect("customers");
        let orders = prompt.find("Tabela: orders").expect("orders");
        let email = prompt.find("- email").expect("email");
        assert!(customers < email && email < orders);
    }

    #[rstest]
    fn stats_count_entities_and_measure_description(rich: Schema) {
        let stats = schema_stats(&rich);
        assert_eq!(stats.tables, 2);
        assert_eq!(stats.columns, 4);
        assert_eq!(stats.relationships, 1);
        assert_eq!(
            stats.prompt_size,
            SchemaDescription(&rich).to_string().chars().count()
        );
    }

    #[rstest]
    fn prompt_size_counts_characters_not_bytes() {
        let schema = Schema {
            database_name: "ç".to_owned(),
            tables: vec![Table::new("t", vec![])],
            relationships: Vec::new(),
        };
        let text = SchemaDescription(&schema).to_string();
        assert!(text.len() > text.chars().count());
        assert_eq!(schema_stats(&schema).prompt_size, text.chars().count());
    }
}
