use crate::core::Record;

pub const SYSTEM_INSTRUCTION: &str =
    "You are an expert in electrocatalysis literature. You extract entities precisely and reply with valid JSON only.";

const PREAMBLE: &str = r#"Read the following paper titles and abstracts about copper-based catalysts and extract three kinds of entities:

1. binary_systems: bimetallic copper systems written as "X-Cu" pairs, where X is the second element (e.g. "Ag-Cu", "Zn-Cu").
2. intermediates: reaction intermediate labels as written in the literature (e.g. "*CO", "*COOH", "*OCHO").
3. descriptors: named theoretical descriptors used to explain activity or selectivity (e.g. "d-band center", "CO binding energy").

Add an entry once for every paper that mentions the entity, so the same label may appear several times.
Respond strictly as a JSON object with exactly three fields, "binary_systems", "intermediates" and "descriptors", each a list of strings. Do not add any text outside the JSON object.

Papers:"#;

/// 組出單一批次的請求內容
pub fn build_prompt(batch: &[Record]) -> String {
    let papers = batch
        .iter()
        .map(|record| format!("Title: {}\nAbstract: {}", record.title, record.abstract_text))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("{}\n\n{}", PREAMBLE, papers)
}
