//! Block Kit layout carried from a mention into the reply.
//!
//! Blocks are kept as opaque JSON; only the first rich-text section is touched:
//! `blocks[0].elements[0].elements[..]`.

use serde_json::Value;

/// Non-empty list of Block Kit blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct RichLayout(Vec<Value>);

impl RichLayout {
    /// None when the event carried no blocks (or an empty list).
    pub fn from_blocks(blocks: Option<Vec<Value>>) -> Option<Self> {
        blocks.filter(|b| !b.is_empty()).map(Self)
    }

    fn first_section_elements(&mut self) -> Option<&mut Vec<Value>> {
        self.0
            .get_mut(0)?
            .get_mut("elements")?
            .get_mut(0)?
            .get_mut("elements")?
            .as_array_mut()
    }

    /// Drop the leading element of the first section (the `@bot` user element of a mention).
    pub fn strip_leading_mention(&mut self) {
        if let Some(elements) = self.first_section_elements() {
            if !elements.is_empty() {
                elements.remove(0);
            }
        }
    }

    /// Put `answer` into the first element of the first section. Returns false when the
    /// layout does not have that shape; the layout is left unchanged then.
    pub fn replace_first_text(&mut self, answer: &str) -> bool {
        let Some(first) = self
            .first_section_elements()
            .and_then(|elements| elements.get_mut(0))
            .and_then(Value::as_object_mut)
        else {
            return false;
        };
        first.insert("text".to_string(), Value::String(answer.to_string()));
        true
    }

    pub fn blocks(&self) -> &[Value] {
        &self.0
    }

    pub fn into_blocks(self) -> Vec<Value> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mention_blocks() -> Vec<Value> {
        vec![json!({
            "type": "rich_text",
            "block_id": "abc",
            "elements": [{
                "type": "rich_text_section",
                "elements": [
                    { "type": "user", "user_id": "U123" },
                    { "type": "text", "text": " hello there" }
                ]
            }]
        })]
    }

    #[test]
    fn empty_blocks_are_no_layout() {
        assert!(RichLayout::from_blocks(None).is_none());
        assert!(RichLayout::from_blocks(Some(vec![])).is_none());
    }

    #[test]
    fn strip_then_replace_yields_answer_only() {
        let mut layout = RichLayout::from_blocks(Some(mention_blocks())).unwrap();
        layout.strip_leading_mention();
        assert!(layout.replace_first_text("the answer"));
        let blocks = layout.into_blocks();
        let elements = blocks[0]["elements"][0]["elements"].as_array().unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0]["text"], "the answer");
        assert_eq!(elements[0]["type"], "text");
        assert_eq!(blocks[0]["block_id"], "abc");
    }

    #[test]
    fn replace_fails_when_section_is_empty() {
        let mut layout = RichLayout::from_blocks(Some(vec![json!({
            "type": "rich_text",
            "elements": [{
                "type": "rich_text_section",
                "elements": [{ "type": "user", "user_id": "U1" }]
            }]
        })]))
        .unwrap();
        layout.strip_leading_mention();
        assert!(!layout.replace_first_text("x"));
    }

    #[test]
    fn unexpected_shape_is_left_alone() {
        let original = vec![json!({
            "type": "section",
            "text": { "type": "mrkdwn", "text": "hi" }
        })];
        let mut layout = RichLayout::from_blocks(Some(original.clone())).unwrap();
        layout.strip_leading_mention();
        assert!(!layout.replace_first_text("x"));
        assert_eq!(layout.blocks(), original.as_slice());
    }
}
