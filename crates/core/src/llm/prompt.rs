use crate::domain::AnalysisRequest;
use serde::Serialize;
use std::collections::BTreeMap;

/// Structural output constraint in the Gemini schema dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDescriptor {
    #[serde(rename = "type")]
    pub kind: SchemaType,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<&'static str, SchemaDescriptor>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub property_ordering: Vec<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaDescriptor>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    Object,
    Array,
    String,
}

impl SchemaDescriptor {
    fn string() -> Self {
        Self::leaf(SchemaType::String)
    }

    fn array_of(items: SchemaDescriptor) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::leaf(SchemaType::Array)
        }
    }

    /// Every listed field is required, in the listed order.
    fn object(fields: Vec<(&'static str, SchemaDescriptor)>) -> Self {
        let order: Vec<&'static str> = fields.iter().map(|(name, _)| *name).collect();
        Self {
            properties: fields.into_iter().collect(),
            property_ordering: order.clone(),
            required: order,
            ..Self::leaf(SchemaType::Object)
        }
    }

    fn leaf(kind: SchemaType) -> Self {
        Self {
            kind,
            properties: BTreeMap::new(),
            property_ordering: Vec::new(),
            required: Vec::new(),
            items: None,
        }
    }
}

/// Prompt plus output schema for a single analysis call.
#[derive(Debug, Clone)]
pub struct BuiltRequest {
    pub prompt: String,
    pub schema: SchemaDescriptor,
}

pub fn build(request: &AnalysisRequest) -> BuiltRequest {
    BuiltRequest {
        prompt: prompt_text(request),
        schema: response_schema(),
    }
}

pub fn response_schema() -> SchemaDescriptor {
    let recommendation = SchemaDescriptor::object(vec![
        ("name", SchemaDescriptor::string()),
        ("price", SchemaDescriptor::string()),
        ("why", SchemaDescriptor::string()),
        ("specs", SchemaDescriptor::array_of(SchemaDescriptor::string())),
        ("cons", SchemaDescriptor::array_of(SchemaDescriptor::string())),
    ]);

    SchemaDescriptor::object(vec![
        ("categoryOverview", SchemaDescriptor::string()),
        ("recommendations", SchemaDescriptor::array_of(recommendation)),
        ("finalVerdict", SchemaDescriptor::string()),
    ])
}

fn prompt_text(request: &AnalysisRequest) -> String {
    let example = [
        "{",
        "  \"categoryOverview\": \"A brief 1-sentence summary of the current market trend.\",",
        "  \"recommendations\": [",
        "    {",
        "      \"name\": \"Product Name\",",
        "      \"price\": \"Estimated Current Price\",",
        "      \"why\": \"Scientific explanation of value proposition.\",",
        "      \"specs\": [\"spec 1\", \"spec 2\", \"spec 3\"],",
        "      \"cons\": [\"con 1\", \"con 2\"]",
        "    }",
        "  ],",
        "  \"finalVerdict\": \"A one-sentence direct recommendation on which specific user profile should buy which of the 3 items.\"",
        "}",
    ]
    .join("\n");

    format!(
        "You are an expert \"Value-for-Money Product Analyst\" AI.\n\
Your objective is to recommend the best \"Price-to-Performance\" products for the category: \"{category}\" with a budget of approximately \"{budget}\".\n\n\
{language_directive}\n\n\
Strictly follow this methodology:\n\
Step 1: Data Collection (Observation): Search the web for the latest products in this category. Gather real-time data on current prices and key technical specifications.\n\
Step 2: Variable Identification (Metrics): Identify the 3 to 5 most critical performance metrics for this specific product category.\n\
Step 3: Comparative Analysis (Testing): Weigh the performance metrics against the current market price. Calculate a hypothetical \"Value Score\" (Performance output divided by Cost).\n\
Step 4: Conclusion (Output): Select the top 3 products that offer the absolute best return on investment.\n\n\
Return the result in JSON format matching this schema:\n{example}",
        category = request.category,
        budget = request.budget,
        language_directive = language_directive(request),
    )
}

fn language_directive(request: &AnalysisRequest) -> String {
    format!(
        "IMPORTANT: You MUST return all text fields in the JSON response in the following language: {}.",
        request.language.prompt_name()
    )
}
