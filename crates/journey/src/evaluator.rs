use chrono::{DateTime, Utc};
use drip_core::node::{Comparison, ConditionSpec, InteractionCheck};
use drip_core::time::{local_minute_of_day, parse_instant};
use drip_core::types::SimulationContext;
use tracing::debug;

/// Which recorded interaction a condition inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interaction {
    Opened,
    Clicked,
}

/// Evaluates condition nodes against a simulation context.
#[derive(Debug, Clone)]
pub struct ConditionEvaluator {
    wall_clock: fn() -> DateTime<Utc>,
}

impl ConditionEvaluator {
    pub fn new() -> Self {
        Self { wall_clock: Utc::now }
    }

    /// Replace the real-time source used by interaction wait checks.
    pub fn with_wall_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.wall_clock = clock;
        self
    }

    /// Returns whether the condition holds. Unparsable inputs evaluate to
    /// `false` rather than failing.
    pub fn evaluate(&self, condition: &ConditionSpec, ctx: &SimulationContext) -> bool {
        match condition {
            ConditionSpec::Date(cmp) => evaluate_date(cmp, ctx),
            ConditionSpec::Time(cmp) => evaluate_time(cmp, ctx),
            ConditionSpec::Opened(check) => self.evaluate_interaction(check, ctx, Interaction::Opened),
            ConditionSpec::Clicked(check) => {
                self.evaluate_interaction(check, ctx, Interaction::Clicked)
            }
            ConditionSpec::Unknown(_) => false,
        }
    }

    fn evaluate_interaction(
        &self,
        check: &InteractionCheck,
        ctx: &SimulationContext,
        interaction: Interaction,
    ) -> bool {
        let email_id = check.email_ref.clone().or_else(|| match interaction {
            Interaction::Opened => ctx.opened_override(),
            Interaction::Clicked => ctx.clicked_override(),
        });

        let recorded = email_id
            .as_deref()
            .and_then(|id| ctx.emails.get(id))
            .map(|record| match interaction {
                Interaction::Opened => record.opened,
                Interaction::Clicked => record.clicked,
            })
            .unwrap_or(false);

        debug!(email_id = ?email_id, ?interaction, recorded, "Interaction condition checked");

        if !recorded || !check.wait.is_set() {
            return recorded;
        }

        // Real time elapsed since the simulated `now`, not simulated time.
        match parse_instant(&ctx.now) {
            Some(now) => {
                let elapsed_ms = (self.wall_clock)()
                    .signed_duration_since(now)
                    .num_milliseconds();
                check
                    .wait
                    .total_ms()
                    .is_some_and(|total| elapsed_ms >= total)
            }
            None => false,
        }
    }
}

impl Default for ConditionEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

fn evaluate_date(cmp: &Comparison, ctx: &SimulationContext) -> bool {
    let now = parse_instant(&ctx.now);
    let value = cmp.value.as_deref().and_then(parse_instant);
    match (now, value) {
        (Some(now), Some(value)) => cmp.operator.compare(&now, &value),
        _ => false,
    }
}

fn evaluate_time(cmp: &Comparison, ctx: &SimulationContext) -> bool {
    let Some(target) = cmp.value.as_deref().and_then(parse_clock_time) else {
        return false;
    };
    match parse_instant(&ctx.now) {
        Some(now) => cmp.operator.compare(&(local_minute_of_day(&now) as i64), &target),
        None => false,
    }
}

/// Minute of day for `HH:MM`. Each part only needs leading digits, so
/// `"9:05am"` reads as 9:05.
fn parse_clock_time(value: &str) -> Option<i64> {
    let mut parts = value.split(':');
    let hours = leading_digits(parts.next()?)?;
    let minutes = leading_digits(parts.next()?)?;
    hours.checked_mul(60)?.checked_add(minutes)
}

fn leading_digits(part: &str) -> Option<i64> {
    drip_core::node::coerce_int(&serde_json::Value::String(part.to_string()))
}
