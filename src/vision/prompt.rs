/// Instruction sent alongside every uploaded image
pub const DETECTION_PROMPT: &str = r#"Detect every waste item visible in this image.
Return a JSON array only, no prose. Each element describes one item:
{
  "label": short name of the item, e.g. "plastic bottle",
  "box_2d": [ymin, xmin, ymax, xmax] normalized to 0-1000,
  "confidence": number between 0 and 1,
  "category": one of "recyclable", "compostable", "non-recyclable",
  "description": one sentence on the material and how to dispose of it,
  "is_trash": true when the item is waste rather than part of the scene
}
Use "non-recyclable" for items that belong in landfill.
Return [] when no waste items are visible."#;
