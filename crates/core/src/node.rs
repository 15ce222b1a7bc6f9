//! Typed view over the loose editor node.
//!
//! The engine matches on [`NodeKind`] exhaustively; anything the editor sends
//! that this build does not understand surfaces as an `Unknown` variant
//! carrying the original type name.

use serde_json::Value;

use crate::types::Node;

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Event(EventSpec),
    Action(ActionSpec),
    Condition(ConditionSpec),
    Unknown(Option<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventSpec {
    /// Effective event type; `contact_added` when the node leaves it blank.
    pub event_type: String,
    pub list_name: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionSpec {
    Wait(WaitSpec),
    SendEmail(SendEmailSpec),
    Stop,
    Unknown(Option<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaitSpec {
    /// Delay as the editor wrote it, for display.
    pub raw_value: Value,
    /// Delay coerced to whole units; non-numeric input becomes 0.
    pub amount: i64,
    pub unit: DelayUnit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DelayUnit {
    Days,
    Hours,
    /// Any other label. Advances the clock in days.
    Other(String),
}

impl DelayUnit {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None | Some("") | Some("days") => DelayUnit::Days,
            Some("hours") => DelayUnit::Hours,
            Some(other) => DelayUnit::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DelayUnit::Days => "days",
            DelayUnit::Hours => "hours",
            DelayUnit::Other(label) => label,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SendEmailSpec {
    pub subject: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConditionSpec {
    Date(Comparison),
    Time(Comparison),
    Opened(InteractionCheck),
    Clicked(InteractionCheck),
    Unknown(Option<String>),
}

impl ConditionSpec {
    pub fn type_name(&self) -> &str {
        match self {
            ConditionSpec::Date(_) => "date",
            ConditionSpec::Time(_) => "time",
            ConditionSpec::Opened(_) => "opened",
            ConditionSpec::Clicked(_) => "clicked",
            ConditionSpec::Unknown(name) => name.as_deref().unwrap_or("undefined"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub operator: Operator,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
}

impl Operator {
    /// A blank operator means `>`; anything unrecognised compares for equality.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None | Some("") | Some(">") => Operator::Gt,
            Some(">=") => Operator::Ge,
            Some("<") => Operator::Lt,
            Some("<=") => Operator::Le,
            Some(_) => Operator::Eq,
        }
    }

    pub fn compare<T: PartialOrd>(self, lhs: &T, rhs: &T) -> bool {
        match self {
            Operator::Gt => lhs > rhs,
            Operator::Ge => lhs >= rhs,
            Operator::Lt => lhs < rhs,
            Operator::Le => lhs <= rhs,
            Operator::Eq => lhs == rhs,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InteractionCheck {
    /// Explicit `emailRef` (or `emailId`) naming the send_email node.
    pub email_ref: Option<String>,
    pub wait: ConditionWait,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConditionWait {
    pub days: i64,
    pub minutes: i64,
    pub seconds: i64,
    /// A part was given but is not a number. Such a wait can never elapse.
    pub malformed: bool,
}

impl ConditionWait {
    pub fn is_set(&self) -> bool {
        self.malformed || self.days != 0 || self.minutes != 0 || self.seconds != 0
    }

    /// Configured wait in milliseconds; `None` when a part is malformed.
    pub fn total_ms(&self) -> Option<i64> {
        if self.malformed {
            return None;
        }
        Some(
            self.days
                .saturating_mul(86_400_000)
                .saturating_add(self.minutes.saturating_mul(60_000))
                .saturating_add(self.seconds.saturating_mul(1_000)),
        )
    }
}

impl NodeKind {
    pub fn from_node(node: &Node) -> Self {
        match node.node_type.as_deref() {
            Some("event") => NodeKind::Event(EventSpec {
                event_type: node
                    .data_str("eventType")
                    .unwrap_or("contact_added")
                    .to_string(),
                list_name: node.data_str("listName").map(str::to_string),
                date: node.data_str("date").map(str::to_string),
            }),
            Some("action") => NodeKind::Action(action_spec(node)),
            Some("condition") => NodeKind::Condition(condition_spec(node)),
            other => NodeKind::Unknown(other.map(str::to_string)),
        }
    }
}

fn action_spec(node: &Node) -> ActionSpec {
    match node.data_str("actionType") {
        Some("wait") => {
            let raw_value = node
                .data
                .get("delayValue")
                .filter(|v| is_truthy(v))
                .cloned()
                .unwrap_or(Value::from(1));
            ActionSpec::Wait(WaitSpec {
                amount: coerce_int(&raw_value).unwrap_or(0),
                raw_value,
                unit: DelayUnit::parse(node.data_str("delayUnit")),
            })
        }
        Some("send_email") => ActionSpec::SendEmail(SendEmailSpec {
            subject: node.data_str("subject").map(str::to_string),
            body: node.data_str("body").map(str::to_string),
        }),
        Some("stop") => ActionSpec::Stop,
        other => ActionSpec::Unknown(other.map(str::to_string)),
    }
}

fn condition_spec(node: &Node) -> ConditionSpec {
    let comparison = || Comparison {
        operator: Operator::parse(node.data_str("operator")),
        value: node.data.get("value").and_then(scalar_text),
    };
    let interaction = || InteractionCheck {
        email_ref: node
            .data_str("emailRef")
            .or_else(|| node.data_str("emailId"))
            .map(str::to_string),
        wait: condition_wait(node),
    };
    match node.data_str("conditionType") {
        Some("date") => ConditionSpec::Date(comparison()),
        Some("time") => ConditionSpec::Time(comparison()),
        Some("opened") => ConditionSpec::Opened(interaction()),
        Some("clicked") => ConditionSpec::Clicked(interaction()),
        other => ConditionSpec::Unknown(other.map(str::to_string)),
    }
}

fn condition_wait(node: &Node) -> ConditionWait {
    let mut wait = ConditionWait::default();
    for (key, slot) in [
        ("waitDays", &mut wait.days),
        ("waitMinutes", &mut wait.minutes),
        ("waitSeconds", &mut wait.seconds),
    ] {
        match node.data.get(key).filter(|v| is_truthy(v)) {
            None => {}
            Some(value) => match wait_number(value) {
                Some(n) => *slot = n,
                None => wait.malformed = true,
            },
        }
    }
    wait
}

/// Whole number from a wait part. Strings must be entirely numeric.
fn wait_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(_) => coerce_int(value),
        Value::Bool(true) => Some(1),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64),
        _ => None,
    }
}

/// Text form of a scalar; `None` for null, empty strings and structures.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Integer from a number or from the leading digits of a string (`"3 days"` is 3).
pub fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => leading_int(s),
        _ => None,
    }
}

fn leading_int(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<i64>().ok().map(|n| sign * n)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_defaults_to_contact_added() {
        let node = Node::new("e1", "event", json!({"listName": "vip"}));
        match node.kind() {
            NodeKind::Event(spec) => {
                assert_eq!(spec.event_type, "contact_added");
                assert_eq!(spec.list_name.as_deref(), Some("vip"));
            }
            other => panic!("expected event, got {:?}", other),
        }
    }

    #[test]
    fn test_wait_delay_coercion() {
        let wait = |data| match Node::new("w", "action", data).kind() {
            NodeKind::Action(ActionSpec::Wait(spec)) => spec,
            other => panic!("expected wait, got {:?}", other),
        };
        assert_eq!(wait(json!({"actionType": "wait"})).amount, 1);
        assert_eq!(wait(json!({"actionType": "wait", "delayValue": 0})).amount, 1);
        assert_eq!(wait(json!({"actionType": "wait", "delayValue": 3})).amount, 3);
        assert_eq!(wait(json!({"actionType": "wait", "delayValue": "2"})).amount, 2);
        assert_eq!(wait(json!({"actionType": "wait", "delayValue": "abc"})).amount, 0);
        assert_eq!(wait(json!({"actionType": "wait", "delayValue": 2.9})).amount, 2);

        assert_eq!(wait(json!({"actionType": "wait"})).unit, DelayUnit::Days);
        assert_eq!(
            wait(json!({"actionType": "wait", "delayUnit": "hours"})).unit,
            DelayUnit::Hours
        );
        assert_eq!(
            wait(json!({"actionType": "wait", "delayUnit": "minutes"})).unit,
            DelayUnit::Other("minutes".into())
        );
    }

    #[test]
    fn test_unknown_types_keep_their_name() {
        assert_eq!(
            Node::new("x", "split", json!({})).kind(),
            NodeKind::Unknown(Some("split".into()))
        );
        assert_eq!(
            Node::new("a", "action", json!({"actionType": "sms"})).kind(),
            NodeKind::Action(ActionSpec::Unknown(Some("sms".into())))
        );
        let mut untyped = Node::new("n", "event", json!({}));
        untyped.node_type = None;
        assert_eq!(untyped.kind(), NodeKind::Unknown(None));
    }

    #[test]
    fn test_operator_parsing() {
        assert_eq!(Operator::parse(None), Operator::Gt);
        assert_eq!(Operator::parse(Some("")), Operator::Gt);
        assert_eq!(Operator::parse(Some(">=")), Operator::Ge);
        assert_eq!(Operator::parse(Some("<")), Operator::Lt);
        assert_eq!(Operator::parse(Some("<=")), Operator::Le);
        assert_eq!(Operator::parse(Some("=")), Operator::Eq);
        assert_eq!(Operator::parse(Some("~")), Operator::Eq);
        assert!(Operator::Le.compare(&3, &3));
        assert!(!Operator::Lt.compare(&3, &3));
    }

    #[test]
    fn test_interaction_condition_fields() {
        let node = Node::new(
            "c1",
            "condition",
            json!({"conditionType": "clicked", "emailId": "action2", "waitMinutes": "5", "waitSeconds": 30}),
        );
        match node.kind() {
            NodeKind::Condition(ConditionSpec::Clicked(check)) => {
                assert_eq!(check.email_ref.as_deref(), Some("action2"));
                assert!(check.wait.is_set());
                assert_eq!(check.wait.total_ms(), Some(5 * 60_000 + 30_000));
            }
            other => panic!("expected clicked condition, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_wait_part_is_malformed() {
        let wait = |data| match Node::new("c", "condition", data).kind() {
            NodeKind::Condition(ConditionSpec::Opened(check)) => check.wait,
            other => panic!("expected opened condition, got {:?}", other),
        };
        let bad = wait(json!({"conditionType": "opened", "waitDays": "abc"}));
        assert!(bad.is_set());
        assert_eq!(bad.total_ms(), None);

        let partly = wait(json!({"conditionType": "opened", "waitMinutes": "3 min"}));
        assert!(partly.malformed);

        let blank = wait(json!({"conditionType": "opened", "waitDays": "", "waitSeconds": 0}));
        assert!(!blank.is_set());
        assert_eq!(blank.total_ms(), Some(0));
    }

    #[test]
    fn test_coerce_int() {
        assert_eq!(coerce_int(&json!(7)), Some(7));
        assert_eq!(coerce_int(&json!("  -4x")), Some(-4));
        assert_eq!(coerce_int(&json!("x4")), None);
        assert_eq!(coerce_int(&json!(null)), None);
        assert_eq!(coerce_int(&json!(true)), None);
    }
}
