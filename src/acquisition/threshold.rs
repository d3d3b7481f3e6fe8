use serde::Deserialize;
use crate::acquisition::parser::ReadingFrame;
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Above,
    Below,
}
/// Single-channel limit checked against every accepted frame.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct ThresholdRule {
    pub channel: usize,
    pub comparison: Comparison,
    pub limit: f64,
}
impl Default for ThresholdRule {
    fn default() -> Self {
        // High-pressure warning on the barometer channel.
        Self {
            channel: 2,
            comparison: Comparison::Above,
            limit: 1015.0,
        }
    }
}
#[derive(Clone, Debug, PartialEq)]
pub struct Alert {
    pub channel: usize,
    pub value: f64,
    pub limit: f64,
    pub comparison: Comparison,
}
impl ThresholdRule {
    /// Strict comparison: a value sitting exactly on the limit never alerts.
    pub fn evaluate(&self, frame: &ReadingFrame) -> Option<Alert> {
        let value = frame.get(self.channel)?;
        let triggered = match self.comparison {
            Comparison::Above => value > self.limit,
            Comparison::Below => value < self.limit,
        };
        triggered.then_some(Alert {
            channel: self.channel,
            value,
            limit: self.limit,
            comparison: self.comparison,
        })
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    fn pressure(value: f64) -> ReadingFrame {
        ReadingFrame::new(vec![100.0, 25.0, value, 500.0])
    }
    #[test]
    fn fires_only_strictly_above_limit() {
        let rule = ThresholdRule::default();
        assert!(rule.evaluate(&pressure(1015.0)).is_none());
        assert!(rule.evaluate(&pressure(1014.9)).is_none());
        let alert = rule.evaluate(&pressure(1016.0)).unwrap();
        assert_eq!(alert.channel, 2);
        assert_eq!(alert.value, 1016.0);
        assert_eq!(alert.limit, 1015.0);
    }
    #[test]
    fn below_rule_mirrors_above() {
        let rule = ThresholdRule {
            channel: 1,
            comparison: Comparison::Below,
            limit: 5.0,
        };
        let cold = ReadingFrame::new(vec![0.0, 4.5, 0.0, 0.0]);
        let edge = ReadingFrame::new(vec![0.0, 5.0, 0.0, 0.0]);
        assert!(rule.evaluate(&cold).is_some());
        assert!(rule.evaluate(&edge).is_none());
    }
    #[test]
    fn missing_channel_never_alerts() {
        let rule = ThresholdRule {
            channel: 9,
            ..ThresholdRule::default()
        };
        assert!(rule.evaluate(&pressure(2000.0)).is_none());
    }
}
