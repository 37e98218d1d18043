//! Save-gating validation for templates.
//!
//! Reports structural issues without modifying the template. Validation
//! never fails hard: the result is a list of human-readable messages and
//! the template is save-eligible exactly when the list is empty.

use crate::id::LayerId;
use crate::model::{DesignSize, ImageData, LayerKind, LayerTag, Template};

// ─── Diagnostic types ────────────────────────────────────────────────────

/// A single validation message for a template or one of its layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationMessage {
    /// The layer this message refers to, if any.
    pub layer: Option<LayerId>,
    /// Human-readable message.
    pub message: String,
    /// Short stable rule identifier (e.g. "template-name", "layer-incomplete").
    pub rule: &'static str,
}

impl ValidationMessage {
    fn template(rule: &'static str, message: impl Into<String>) -> Self {
        Self {
            layer: None,
            message: message.into(),
            rule,
        }
    }

    fn layer(id: LayerId, rule: &'static str, message: impl Into<String>) -> Self {
        Self {
            layer: Some(id),
            message: message.into(),
            rule,
        }
    }
}

// ─── Public API ──────────────────────────────────────────────────────────

/// Run all validation rules over the template and return the messages.
/// Empty result ⇔ the template may be saved.
#[must_use]
pub fn validate_template(template: &Template) -> Vec<ValidationMessage> {
    let mut msgs = Vec::new();
    check_template_name(template, &mut msgs);
    check_design_presence(template, &mut msgs);
    check_needs_layer(template, &mut msgs);
    check_layer_fields(template, &mut msgs);
    msgs
}

/// The single summarized message shown to the user, when any exist.
/// First error wins.
pub fn first_message(msgs: &[ValidationMessage]) -> Option<&str> {
    msgs.first().map(|m| m.message.as_str())
}

// ─── Rules ───────────────────────────────────────────────────────────────

fn check_template_name(template: &Template, msgs: &mut Vec<ValidationMessage>) {
    if template.name.trim().is_empty() {
        msgs.push(ValidationMessage::template(
            "template-name",
            "The template needs a name before it can be saved.",
        ));
    }
}

fn check_design_presence(template: &Template, msgs: &mut Vec<ValidationMessage>) {
    let designs = template
        .layers
        .iter()
        .filter(|l| l.tag() == LayerTag::Design)
        .count();
    match designs {
        0 => msgs.push(ValidationMessage::template(
            "design-missing",
            "The template has no background design.",
        )),
        1 => {}
        n => msgs.push(ValidationMessage::template(
            "design-duplicate",
            format!("The template has {n} background designs; only one is allowed."),
        )),
    }
}

fn check_needs_layer(template: &Template, msgs: &mut Vec<ValidationMessage>) {
    let non_design = template
        .layers
        .iter()
        .filter(|l| l.tag() != LayerTag::Design)
        .count();
    if non_design == 0 {
        msgs.push(ValidationMessage::template(
            "needs-layer",
            "Add at least one layer besides the background design.",
        ));
    }
}

/// Every layer's variant-specific required fields must be populated.
fn check_layer_fields(template: &Template, msgs: &mut Vec<ValidationMessage>) {
    for layer in &template.layers {
        match &layer.kind {
            LayerKind::Design(d) => {
                if d.image.is_none() {
                    msgs.push(ValidationMessage::layer(
                        layer.id,
                        "layer-incomplete",
                        format!("`{}` has no design image.", layer.name),
                    ));
                }
            }
            LayerKind::Picture(p) => {
                if p.image.is_none() {
                    msgs.push(ValidationMessage::layer(
                        layer.id,
                        "layer-incomplete",
                        format!("`{}` has no picture.", layer.name),
                    ));
                }
            }
            LayerKind::Frame(f) => {
                if f.image_index.is_none() {
                    msgs.push(ValidationMessage::layer(
                        layer.id,
                        "layer-incomplete",
                        format!("`{}` has no image selected.", layer.name),
                    ));
                }
            }
            LayerKind::Text(t) => {
                if t.variable.is_none() {
                    msgs.push(ValidationMessage::layer(
                        layer.id,
                        "layer-incomplete",
                        format!("`{}` has no text variable selected.", layer.name),
                    ));
                }
                if t.font_family.is_none() {
                    msgs.push(ValidationMessage::layer(
                        layer.id,
                        "layer-incomplete",
                        format!("`{}` has no font selected.", layer.name),
                    ));
                }
            }
        }
    }
}

// ─── Design ratio check ──────────────────────────────────────────────────

/// Relative deviation allowed between an uploaded design image's aspect
/// and the template's design-size tag.
pub const DEFAULT_RATIO_TOLERANCE: f64 = 0.02;

/// Check an uploaded background image against the template's aspect tag.
/// Returns a message when the image deviates beyond `tolerance`;
/// `None` means the image is acceptable.
pub fn design_ratio_message(
    size: DesignSize,
    image: &ImageData,
    tolerance: f64,
) -> Option<ValidationMessage> {
    let expected = size.ratio();
    let actual = image.aspect();
    let deviation = (actual - expected).abs() / expected;
    if deviation <= tolerance {
        return None;
    }
    Some(ValidationMessage::template(
        "design-ratio",
        format!(
            "The design image is {:.0}×{:.0}, which does not match the {} format.",
            image.width,
            image.height,
            size.tag()
        ),
    ))
}

// ─── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DesignProps, Layer, TextProps};
    use pretty_assertions::assert_eq;

    fn design_layer(with_image: bool) -> Layer {
        Layer::new(
            LayerId::design(),
            "Design 1",
            LayerKind::Design(DesignProps {
                image: with_image.then(|| ImageData::new("bg.png", 1080.0, 1080.0)),
            }),
        )
    }

    fn complete_text_layer() -> Layer {
        Layer::new(
            LayerId::intern("headline"),
            "Text 1",
            LayerKind::Text(TextProps {
                variable: Some("price".into()),
                font_family: Some("Inter".into()),
                ..TextProps::default()
            }),
        )
    }

    #[test]
    fn empty_template_reports_all_structural_rules() {
        let template = Template::new(DesignSize::Square);
        let msgs = validate_template(&template);
        assert!(msgs.len() >= 3, "expected >= 3 messages, got {msgs:?}");

        let rules: Vec<_> = msgs.iter().map(|m| m.rule).collect();
        assert!(rules.contains(&"template-name"));
        assert!(rules.contains(&"design-missing"));
        assert!(rules.contains(&"needs-layer"));
    }

    #[test]
    fn design_only_template_needs_another_layer() {
        let mut template = Template::new(DesignSize::Square);
        template.name = "Spring sale".into();
        template.insert_top(design_layer(true));

        let msgs = validate_template(&template);
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].rule, "needs-layer");
    }

    #[test]
    fn complete_template_is_save_eligible() {
        let mut template = Template::new(DesignSize::Square);
        template.name = "Spring sale".into();
        template.insert_top(design_layer(true));
        template.insert_top(complete_text_layer());

        assert_eq!(validate_template(&template), vec![]);
    }

    #[test]
    fn incomplete_text_layer_reports_both_fields() {
        let mut template = Template::new(DesignSize::Square);
        template.name = "Spring sale".into();
        template.insert_top(design_layer(true));
        template.insert_top(Layer::new(
            LayerId::intern("empty_text"),
            "Text 1",
            LayerKind::Text(TextProps::default()),
        ));

        let msgs = validate_template(&template);
        let incomplete = msgs.iter().filter(|m| m.rule == "layer-incomplete").count();
        assert_eq!(incomplete, 2, "variable and font both missing: {msgs:?}");
    }

    #[test]
    fn first_message_wins() {
        let template = Template::new(DesignSize::Square);
        let msgs = validate_template(&template);
        assert_eq!(
            first_message(&msgs),
            Some("The template needs a name before it can be saved.")
        );
    }

    #[test]
    fn ratio_within_tolerance_passes() {
        // 1082×1080 is ~0.2% off square — inside the default 2% band.
        let img = ImageData::new("bg.png", 1082.0, 1080.0);
        assert_eq!(
            design_ratio_message(DesignSize::Square, &img, DEFAULT_RATIO_TOLERANCE),
            None
        );
    }

    #[test]
    fn ratio_out_of_tolerance_reports() {
        let img = ImageData::new("bg.png", 1920.0, 1080.0);
        let msg = design_ratio_message(DesignSize::Square, &img, DEFAULT_RATIO_TOLERANCE);
        assert_eq!(msg.unwrap().rule, "design-ratio");
    }
}
