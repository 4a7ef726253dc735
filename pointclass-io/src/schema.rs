//! Vertex attribute schema
//!
//! Turns the `property` declarations of a PLY vertex element into a typed
//! record layout: which optional channels are present, where each declared
//! property sits inside a binary record, and how the color components are
//! ordered on disk. Property names are matched once here; decoding works only
//! with the resolved [`Channel`] of each property.

use pointclass_core::{Error, Result};

/// Scan guard: number of header lines after `x`, `y`, `z` that may precede
/// `end_header`.
pub const MAX_HEADER_PROPERTIES: usize = 100;

/// PLY scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Float32,
    Float64,
}

impl ScalarType {
    /// Parse a scalar type from its PLY spelling
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "char" | "int8" => Some(ScalarType::Int8),
            "uchar" | "uint8" => Some(ScalarType::UInt8),
            "short" | "int16" => Some(ScalarType::Int16),
            "ushort" | "uint16" => Some(ScalarType::UInt16),
            "int" | "int32" => Some(ScalarType::Int32),
            "uint" | "uint32" => Some(ScalarType::UInt32),
            "float" | "float32" => Some(ScalarType::Float32),
            "double" | "float64" => Some(ScalarType::Float64),
            _ => None,
        }
    }

    /// Size of one value in a binary record
    pub fn size(self) -> usize {
        match self {
            ScalarType::Int8 | ScalarType::UInt8 => 1,
            ScalarType::Int16 | ScalarType::UInt16 => 2,
            ScalarType::Int32 | ScalarType::UInt32 | ScalarType::Float32 => 4,
            ScalarType::Float64 => 8,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, ScalarType::Float32 | ScalarType::Float64)
    }
}

/// The point channel a vertex property feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    X,
    Y,
    Z,
    NormalX,
    NormalY,
    NormalZ,
    Red,
    Green,
    Blue,
    View,
    Label,
    /// Declared but not stored; skipped while decoding
    Ignored,
}

impl Channel {
    /// Resolve a property name against the accepted spellings of each channel
    pub fn from_property(name: &str) -> Self {
        match name {
            "x" => Channel::X,
            "y" => Channel::Y,
            "z" => Channel::Z,
            "nx" | "normal_x" | "normalx" => Channel::NormalX,
            "ny" | "normal_y" | "normaly" => Channel::NormalY,
            "nz" | "normal_z" | "normalz" => Channel::NormalZ,
            "red" => Channel::Red,
            "green" => Channel::Green,
            "blue" => Channel::Blue,
            "views" => Channel::View,
            "label" | "classification" | "class" => Channel::Label,
            _ => Channel::Ignored,
        }
    }
}

/// One declared vertex property
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDef {
    pub name: String,
    pub scalar: ScalarType,
    pub channel: Channel,
    /// Byte offset of the value inside a binary record
    pub offset: usize,
}

/// Position of each color component relative to the first color property.
///
/// Always a permutation of `0, 1, 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorLayout {
    pub red: usize,
    pub green: usize,
    pub blue: usize,
}

impl Default for ColorLayout {
    fn default() -> Self {
        Self {
            red: 0,
            green: 1,
            blue: 2,
        }
    }
}

/// Resolved layout of a vertex record
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSchema {
    pub properties: Vec<PropertyDef>,
    pub record_size: usize,
    pub has_normals: bool,
    pub colors: Option<ColorLayout>,
    pub has_views: bool,
    /// Name of the property used as the label channel
    pub label_dimension: Option<String>,
}

impl AttributeSchema {
    pub fn has_colors(&self) -> bool {
        self.colors.is_some()
    }

    pub fn has_labels(&self) -> bool {
        self.label_dimension.is_some()
    }
}

/// Accumulates property declarations in header order
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    properties: Vec<PropertyDef>,
    record_size: usize,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of properties declared so far
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Declare the next property of the vertex element
    pub fn push(&mut self, name: &str, scalar: ScalarType) {
        let mut channel = Channel::from_property(name);

        // Only one label dimension is supported; the first declared wins.
        if channel == Channel::Label && self.has_channel(Channel::Label) {
            channel = Channel::Ignored;
        }

        self.properties.push(PropertyDef {
            name: name.to_string(),
            scalar,
            channel,
            offset: self.record_size,
        });
        self.record_size += scalar.size();
    }

    /// Validate the declarations and resolve the channel layout
    pub fn finish(self) -> Result<AttributeSchema> {
        for channel in [
            Channel::X,
            Channel::Y,
            Channel::Z,
            Channel::NormalX,
            Channel::NormalY,
            Channel::NormalZ,
            Channel::Red,
            Channel::Green,
            Channel::Blue,
            Channel::View,
        ] {
            if self.count(channel) > 1 {
                return Err(Error::MalformedSchema(format!(
                    "property for {:?} declared more than once",
                    channel
                )));
            }
        }

        let colors = self.resolve_colors()?;
        let label_dimension = self
            .properties
            .iter()
            .find(|p| p.channel == Channel::Label)
            .map(|p| p.name.clone());

        Ok(AttributeSchema {
            has_normals: self.has_channel(Channel::NormalX),
            has_views: self.has_channel(Channel::View),
            colors,
            label_dimension,
            record_size: self.record_size,
            properties: self.properties,
        })
    }

    fn has_channel(&self, channel: Channel) -> bool {
        self.properties.iter().any(|p| p.channel == channel)
    }

    fn count(&self, channel: Channel) -> usize {
        self.properties.iter().filter(|p| p.channel == channel).count()
    }

    fn slot(&self, channel: Channel) -> Option<usize> {
        self.properties.iter().position(|p| p.channel == channel)
    }

    fn resolve_colors(&self) -> Result<Option<ColorLayout>> {
        let slots = [
            self.slot(Channel::Red),
            self.slot(Channel::Green),
            self.slot(Channel::Blue),
        ];

        let (red, green, blue) = match slots {
            [None, None, None] => return Ok(None),
            [Some(r), Some(g), Some(b)] => (r, g, b),
            _ => {
                return Err(Error::MalformedSchema(
                    "red/green/blue properties must be declared together".to_string(),
                ))
            }
        };

        let first = red.min(green).min(blue);
        let layout = ColorLayout {
            red: red - first,
            green: green - first,
            blue: blue - first,
        };

        let mut offsets = [layout.red, layout.green, layout.blue];
        offsets.sort_unstable();
        if offsets != [0, 1, 2] {
            return Err(Error::MalformedSchema(format!(
                "red/green/blue properties need to be contiguous (found offsets red={}, green={}, blue={})",
                layout.red, layout.green, layout.blue
            )));
        }

        Ok(Some(layout))
    }
}
