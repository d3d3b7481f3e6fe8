use log::debug;
use crate::acquisition::AcquisitionError;
pub const FIELD_DELIMITER: char = ',';
/// One validated line: exactly one value per channel, in channel order.
#[derive(Clone, Debug, PartialEq)]
pub struct ReadingFrame {
    values: Vec<f64>,
}
impl ReadingFrame {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }
    pub fn values(&self) -> &[f64] {
        &self.values
    }
    pub fn get(&self, channel: usize) -> Option<f64> {
        self.values.get(channel).copied()
    }
}
/// Why a line was skipped without being treated as an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RejectReason {
    Empty,
    Header,
    FieldCount { expected: usize, actual: usize },
}
#[derive(Clone, Debug, PartialEq)]
pub enum ParseOutcome {
    Frame(ReadingFrame),
    Rejected(RejectReason),
}
/// Turns raw device lines into clamped reading frames.
#[derive(Clone, Debug)]
pub struct LineParser {
    ceilings: Vec<Option<f64>>, // channel -> clamp ceiling
    header_marker: String,
}
impl LineParser {
    /// `ceilings` has one entry per channel; its length fixes the expected field count.
    pub fn new(ceilings: Vec<Option<f64>>, header_marker: impl Into<String>) -> Self {
        Self {
            ceilings,
            header_marker: header_marker.into(),
        }
    }
    pub fn channel_count(&self) -> usize {
        self.ceilings.len()
    }
    /// Shape problems come back as `Ok(Rejected)`; a field that is not a
    /// finite number is an `Err` and no frame is produced.
    pub fn parse(&self, raw: &str) -> Result<ParseOutcome, AcquisitionError> {
        let line = raw.trim();
        if line.is_empty() {
            return Ok(ParseOutcome::Rejected(RejectReason::Empty));
        }
        if !self.header_marker.is_empty() && line.contains(&self.header_marker) {
            return Ok(ParseOutcome::Rejected(RejectReason::Header));
        }
        let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
        if fields.len() != self.channel_count() {
            return Ok(ParseOutcome::Rejected(RejectReason::FieldCount {
                expected: self.channel_count(),
                actual: fields.len(),
            }));
        }
        let mut values = Vec::with_capacity(fields.len());
        for (index, (field, ceiling)) in fields.iter().zip(&self.ceilings).enumerate() {
            let value = parse_finite(field).ok_or_else(|| AcquisitionError::InvalidField {
                index,
                field: field.to_string(),
            })?;
            let clamped = match ceiling {
                Some(max) if value > *max => {
                    debug!("channel {index}: {value} clamped to {max}");
                    *max
                }
                _ => value,
            };
            values.push(clamped);
        }
        Ok(ParseOutcome::Frame(ReadingFrame::new(values)))
    }
}
fn parse_finite(field: &str) -> Option<f64> {
    field
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
#[cfg(test)]
mod tests {
    use super::*;
    fn parser() -> LineParser {
        LineParser::new(vec![None, None, None, Some(850.0)], "MQ135")
    }
    fn frame(outcome: ParseOutcome) -> ReadingFrame {
        match outcome {
            ParseOutcome::Frame(frame) => frame,
            other => panic!("expected a frame, got {other:?}"),
        }
    }
    #[test]
    fn parses_well_formed_line() {
        let f = frame(parser().parse("100,25.0,1013.0,500\r\n").unwrap());
        assert_eq!(f.values(), &[100.0, 25.0, 1013.0, 500.0]);
    }
    #[test]
    fn light_channel_is_clamped_at_ceiling() {
        let p = parser();
        assert_eq!(frame(p.parse("1,2,3,900").unwrap()).get(3), Some(850.0));
        assert_eq!(frame(p.parse("1,2,3,800").unwrap()).get(3), Some(800.0));
        assert_eq!(frame(p.parse("1,2,3,850").unwrap()).get(3), Some(850.0));
        // ceilings only apply to their own channel
        assert_eq!(frame(p.parse("900,2,3,4").unwrap()).get(0), Some(900.0));
    }
    #[test]
    fn wrong_field_count_is_rejected() {
        let p = parser();
        assert_eq!(
            p.parse("bad,data").unwrap(),
            ParseOutcome::Rejected(RejectReason::FieldCount {
                expected: 4,
                actual: 2
            })
        );
        assert_eq!(
            p.parse("1,2,3,4,5").unwrap(),
            ParseOutcome::Rejected(RejectReason::FieldCount {
                expected: 4,
                actual: 5
            })
        );
    }
    #[test]
    fn blank_and_header_lines_are_rejected() {
        let p = parser();
        assert_eq!(
            p.parse("   \r").unwrap(),
            ParseOutcome::Rejected(RejectReason::Empty)
        );
        assert_eq!(
            p.parse("MQ135,Temp,Pres,Lux").unwrap(),
            ParseOutcome::Rejected(RejectReason::Header)
        );
    }
    #[test]
    fn non_numeric_field_is_an_error() {
        let err = parser().parse("100,abc,1013.0,500").unwrap_err();
        match err {
            AcquisitionError::InvalidField { index, field } => {
                assert_eq!(index, 1);
                assert_eq!(field, "abc");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(parser().parse("100,,1013.0,500").is_err());
    }
    #[test]
    fn non_finite_values_are_errors() {
        assert!(parser().parse("NaN,25.0,1013.0,500").is_err());
        assert!(parser().parse("100,inf,1013.0,500").is_err());
    }
    #[test]
    fn fields_may_carry_spaces() {
        let f = frame(parser().parse(" 100 , 25.5,1013.0 ,  7").unwrap());
        assert_eq!(f.values(), &[100.0, 25.5, 1013.0, 7.0]);
    }
}
