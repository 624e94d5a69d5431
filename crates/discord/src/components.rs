use serde::{Serialize, Serializer};

pub const ACTION_ROW_TYPE: u8 = 1;
pub const BUTTON_TYPE: u8 = 2;
pub const TEXT_INPUT_TYPE: u8 = 4;
pub const MAX_BUTTONS_PER_ROW: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonStyle {
    Primary,
    Secondary,
    Success,
    Danger,
}

impl ButtonStyle {
    pub fn code(self) -> u8 {
        match self {
            Self::Primary => 1,
            Self::Secondary => 2,
            Self::Success => 3,
            Self::Danger => 4,
        }
    }
}

impl Serialize for ButtonStyle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextInputStyle {
    Short,
}

impl Serialize for TextInputStyle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(match self {
            Self::Short => 1,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Button {
    #[serde(rename = "type")]
    kind: u8,
    pub custom_id: String,
    pub label: String,
    pub style: ButtonStyle,
}

impl Button {
    pub fn new(custom_id: impl Into<String>, label: impl Into<String>, style: ButtonStyle) -> Self {
        Self { kind: BUTTON_TYPE, custom_id: custom_id.into(), label: label.into(), style }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TextInput {
    #[serde(rename = "type")]
    kind: u8,
    pub custom_id: String,
    pub label: String,
    pub style: TextInputStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub required: bool,
    pub max_length: usize,
}

impl TextInput {
    pub fn short(
        custom_id: impl Into<String>,
        label: impl Into<String>,
        max_length: usize,
    ) -> Self {
        Self {
            kind: TEXT_INPUT_TYPE,
            custom_id: custom_id.into(),
            label: label.into(),
            style: TextInputStyle::Short,
            placeholder: None,
            required: false,
            max_length,
        }
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Component {
    Button(Button),
    TextInput(TextInput),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActionRow {
    #[serde(rename = "type")]
    kind: u8,
    pub components: Vec<Component>,
}

impl ActionRow {
    pub fn buttons(buttons: impl IntoIterator<Item = Button>) -> Self {
        Self {
            kind: ACTION_ROW_TYPE,
            components: buttons.into_iter().map(Component::Button).collect(),
        }
    }

    pub fn text_input(input: TextInput) -> Self {
        Self { kind: ACTION_ROW_TYPE, components: vec![Component::TextInput(input)] }
    }
}

/// Lays buttons out left to right, starting a new row every [`MAX_BUTTONS_PER_ROW`].
pub fn button_rows(buttons: Vec<Button>) -> Vec<ActionRow> {
    buttons
        .chunks(MAX_BUTTONS_PER_ROW)
        .map(|chunk| ActionRow::buttons(chunk.iter().cloned()))
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
}
