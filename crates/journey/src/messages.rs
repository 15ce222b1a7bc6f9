//! Human-readable step messages shown to the person running a simulation.

use drip_core::node::{ConditionWait, DelayUnit};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    Ru,
    En,
}

impl Locale {
    /// Unknown locale codes fall back to Russian.
    pub fn parse(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en-gb" => Locale::En,
            _ => Locale::Ru,
        }
    }

    pub fn chain_started(self, event_type: &str) -> Option<String> {
        let text = match (self, event_type) {
            (Locale::Ru, "contact_added") => "🚀 Запустил цепочку: новый контакт добавлен",
            (Locale::Ru, "date") => "📅 Запустил цепочку: наступила заданная дата",
            (Locale::En, "contact_added") => "🚀 Chain started: a new contact was added",
            (Locale::En, "date") => "📅 Chain started: the scheduled date arrived",
            _ => return None,
        };
        Some(text.to_string())
    }

    /// "Waited N units". Units other than days and hours read as minutes.
    pub fn waited(self, amount: i64, unit: &DelayUnit) -> String {
        let unit = match unit {
            DelayUnit::Days => Unit::Day,
            DelayUnit::Hours => Unit::Hour,
            DelayUnit::Other(_) => Unit::Minute,
        };
        format!("{} {}", self.waited_prefix(), self.quantity(amount, unit))
    }

    /// Wait configured on an opened/clicked condition; zero parts are omitted.
    pub fn condition_waited(self, wait: &ConditionWait) -> String {
        let parts: Vec<String> = [
            (wait.days, Unit::Day),
            (wait.minutes, Unit::Minute),
            (wait.seconds, Unit::Second),
        ]
        .into_iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, unit)| self.quantity(n, unit))
        .collect();
        if parts.is_empty() {
            return self.waited_prefix().to_string();
        }
        format!("{} {}", self.waited_prefix(), parts.join(" "))
    }

    pub fn email_sent(self, subject: &str) -> String {
        match self {
            Locale::Ru => format!("📧 Отправил письмо \"{subject}\""),
            Locale::En => format!("📧 Sent email \"{subject}\""),
        }
    }

    pub fn condition_result(self, condition_type: &str, holds: bool) -> Option<String> {
        let text = match (self, condition_type, holds) {
            (Locale::Ru, "opened", true) => "✅ Письмо было открыто",
            (Locale::Ru, "opened", false) => "❌ Письмо не было открыто",
            (Locale::Ru, "clicked", true) => "✅ Письмо было кликнуто",
            (Locale::Ru, "clicked", false) => "❌ Письмо не было кликнуто",
            (Locale::Ru, "date", true) => "✅ Дата соответствует условию",
            (Locale::Ru, "date", false) => "❌ Дата не соответствует условию",
            (Locale::Ru, "time", true) => "✅ Время соответствует условию",
            (Locale::Ru, "time", false) => "❌ Время не соответствует условию",
            (Locale::En, "opened", true) => "✅ The email was opened",
            (Locale::En, "opened", false) => "❌ The email was not opened",
            (Locale::En, "clicked", true) => "✅ The email was clicked",
            (Locale::En, "clicked", false) => "❌ The email was not clicked",
            (Locale::En, "date", true) => "✅ The date matches the condition",
            (Locale::En, "date", false) => "❌ The date does not match the condition",
            (Locale::En, "time", true) => "✅ The time matches the condition",
            (Locale::En, "time", false) => "❌ The time does not match the condition",
            _ => return None,
        };
        Some(text.to_string())
    }

    pub fn chain_stopped(self) -> String {
        match self {
            Locale::Ru => "🛑 Цепочка завершена".to_string(),
            Locale::En => "🛑 Chain finished".to_string(),
        }
    }

    fn waited_prefix(self) -> &'static str {
        match self {
            Locale::Ru => "Ждал",
            Locale::En => "Waited",
        }
    }

    fn quantity(self, n: i64, unit: Unit) -> String {
        let word = match self {
            Locale::Ru => {
                let (one, few, many) = unit.russian_forms();
                if n == 1 {
                    one
                } else if n < 5 {
                    few
                } else {
                    many
                }
            }
            Locale::En => {
                let (one, many) = unit.english_forms();
                if n == 1 {
                    one
                } else {
                    many
                }
            }
        };
        format!("{n} {word}")
    }
}

#[derive(Debug, Clone, Copy)]
enum Unit {
    Day,
    Hour,
    Minute,
    Second,
}

impl Unit {
    fn russian_forms(self) -> (&'static str, &'static str, &'static str) {
        match self {
            Unit::Day => ("день", "дня", "дней"),
            Unit::Hour => ("час", "часа", "часов"),
            Unit::Minute => ("минуту", "минуты", "минут"),
            Unit::Second => ("секунду", "секунды", "секунд"),
        }
    }

    fn english_forms(self) -> (&'static str, &'static str) {
        match self {
            Unit::Day => ("day", "days"),
            Unit::Hour => ("hour", "hours"),
            Unit::Minute => ("minute", "minutes"),
            Unit::Second => ("second", "seconds"),
        }
    }
}
