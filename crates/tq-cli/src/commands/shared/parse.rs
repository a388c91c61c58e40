use tq_core::attributes::to_attribute_name;
use tq_core::entities::AttributeMap;

/// Parse `KEY=VALUE`. The key may be a free-form label ("Eye colour"); a
/// blank value means the attribute is unknown.
pub fn parse_attribute(raw: &str) -> anyhow::Result<(String, Option<String>)> {
    let Some((label, value)) = raw.split_once('=') else {
        anyhow::bail!("invalid attribute '{raw}': expected KEY=VALUE");
    };
    let key = to_attribute_name(label)
        .ok_or_else(|| anyhow::anyhow!("invalid attribute name '{}'", label.trim()))?;
    let value = value.trim();
    Ok((key, (!value.is_empty()).then(|| value.to_string())))
}

/// Parse every `KEY=VALUE` argument. A repeated key keeps its last value.
pub fn parse_attributes(raw: &[String]) -> anyhow::Result<AttributeMap> {
    raw.iter().map(|item| parse_attribute(item)).collect()
}
