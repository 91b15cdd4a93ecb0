//! Decoded Sparkplug B payload model.
//!
//! The monitor never touches the protobuf wire format; payloads arrive from an
//! external decoder collaborator already converted into these types. Only the
//! fields the conformance checks inspect are modelled: metric names,
//! datatypes, template values and the numeric accessors needed for `seq` and
//! `bdSeq` validation.

/// Sparkplug B metric datatypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataType {
    Unknown,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float,
    Double,
    Boolean,
    String,
    DateTime,
    Text,
    Uuid,
    DataSet,
    Bytes,
    File,
    Template,
}

impl TryFrom<u32> for DataType {
    type Error = ();

    fn try_from(v: u32) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(DataType::Unknown),
            1 => Ok(DataType::Int8),
            2 => Ok(DataType::Int16),
            3 => Ok(DataType::Int32),
            4 => Ok(DataType::Int64),
            5 => Ok(DataType::UInt8),
            6 => Ok(DataType::UInt16),
            7 => Ok(DataType::UInt32),
            8 => Ok(DataType::UInt64),
            9 => Ok(DataType::Float),
            10 => Ok(DataType::Double),
            11 => Ok(DataType::Boolean),
            12 => Ok(DataType::String),
            13 => Ok(DataType::DateTime),
            14 => Ok(DataType::Text),
            15 => Ok(DataType::Uuid),
            16 => Ok(DataType::DataSet),
            17 => Ok(DataType::Bytes),
            18 => Ok(DataType::File),
            19 => Ok(DataType::Template),
            _ => Err(()),
        }
    }
}

/// A template metric value.
///
/// A template definition declares a reusable structure and carries no
/// `template_ref`; an instance references a definition by name through
/// `template_ref`.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct TemplateValue {
    pub is_definition: Option<bool>,
    pub template_ref: Option<String>,
    pub metrics: Vec<Metric>,
}

impl TemplateValue {
    pub fn definition() -> Self {
        Self {
            is_definition: Some(true),
            ..Default::default()
        }
    }

    pub fn instance_of<S: Into<String>>(reference: S) -> Self {
        Self {
            is_definition: Some(false),
            template_ref: Some(reference.into()),
            ..Default::default()
        }
    }
}

/// A decoded metric value.
#[derive(Clone, Debug, PartialEq)]
pub enum MetricValue {
    Int64(i64),
    UInt64(u64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    Text(String),
    Template(TemplateValue),
}

/// A decoded metric.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Metric {
    pub name: Option<String>,
    pub datatype: Option<DataType>,
    pub timestamp: Option<u64>,
    pub value: Option<MetricValue>,
}

impl Metric {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_name<S: Into<String>>(&mut self, name: S) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn set_datatype(&mut self, datatype: DataType) -> &mut Self {
        self.datatype = Some(datatype);
        self
    }

    pub fn set_timestamp(&mut self, timestamp: u64) -> &mut Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn set_value(&mut self, value: MetricValue) -> &mut Self {
        self.value = Some(value);
        self
    }

    /// The metric value if it holds an unsigned 64 bit integer.
    pub fn u64_value(&self) -> Option<u64> {
        match &self.value {
            Some(MetricValue::UInt64(v)) => Some(*v),
            _ => None,
        }
    }

    /// The metric value if it holds a template.
    pub fn template_value(&self) -> Option<&TemplateValue> {
        match &self.value {
            Some(MetricValue::Template(t)) => Some(t),
            _ => None,
        }
    }
}

/// A decoded Sparkplug B payload.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Payload {
    pub timestamp: Option<u64>,
    pub seq: Option<u64>,
    pub metrics: Vec<Metric>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_builder_and_accessors() {
        let mut metric = Metric::new();
        metric
            .set_name("bdSeq")
            .set_datatype(DataType::UInt64)
            .set_value(MetricValue::UInt64(7));
        assert_eq!(metric.name.as_deref(), Some("bdSeq"));
        assert_eq!(metric.u64_value(), Some(7));
        assert_eq!(metric.template_value(), None);
    }

    #[test]
    fn test_u64_value_requires_u64() {
        let mut metric = Metric::new();
        metric.set_value(MetricValue::Int64(7));
        assert_eq!(metric.u64_value(), None);
    }

    #[test]
    fn test_datatype_from_u32() {
        assert_eq!(DataType::try_from(8), Ok(DataType::UInt64));
        assert_eq!(DataType::try_from(19), Ok(DataType::Template));
        assert_eq!(DataType::try_from(200), Err(()));
    }
}
