use std::sync::Arc;
use std::time::Duration;

use drip_channels::{MockMailer, OutboundEmail};
use drip_core::config::SimulationConfig;
use drip_core::node::{scalar_text, ActionSpec, ConditionSpec, DelayUnit, NodeKind, WaitSpec};
use drip_core::time::{add_days, add_hours, format_instant, parse_instant};
use drip_core::types::{Chain, EmailRecord, Node, SimulationContext, Trigger};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::evaluator::ConditionEvaluator;
use crate::messages::Locale;
use crate::navigator;
use crate::trigger::matching_starts;
use crate::types::{SimulationReport, WalkOutcome};

pub const DEFAULT_MAX_STEPS: usize = 100;
const DEFAULT_SUBJECT: &str = "Hello from MVP";
const DEFAULT_BODY: &str = "This is a test email.";
const DEFAULT_RECIPIENT: &str = "test@example.com";

pub const NO_MATCHING_START: &str = "No matching start event nodes for the specified trigger.";
pub const CHAIN_STOPPED: &str = "Chain stopped.";
pub const SAFETY_LIMIT: &str = "Stopped due to safety limit (possible loop).";

/// Walks a chain from the event node a trigger selects, one node at a time.
#[derive(Clone)]
pub struct SimulationEngine {
    mailer: Arc<MockMailer>,
    evaluator: Arc<ConditionEvaluator>,
    max_steps: usize,
    locale: Locale,
    default_recipient: String,
}

impl std::fmt::Debug for SimulationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationEngine")
            .field("max_steps", &self.max_steps)
            .field("locale", &self.locale)
            .finish()
    }
}

/// Where the walk goes after a node.
enum Next<'a> {
    Goto(&'a str),
    Halt(WalkOutcome),
}

/// Trace accumulated by one run.
#[derive(Default)]
struct Trace {
    logs: Vec<String>,
    user_messages: Vec<String>,
}

impl Trace {
    fn log(&mut self, line: impl Into<String>) {
        self.logs.push(line.into());
    }

    fn message(&mut self, text: impl Into<String>) {
        self.user_messages.push(text.into());
    }
}

impl SimulationEngine {
    pub fn new(mailer: Arc<MockMailer>) -> Self {
        Self {
            mailer,
            evaluator: Arc::new(ConditionEvaluator::new()),
            max_steps: DEFAULT_MAX_STEPS,
            locale: Locale::default(),
            default_recipient: DEFAULT_RECIPIENT.to_string(),
        }
    }

    /// Engine with its own mock mailer, configured from `[simulation]`.
    pub fn from_config(config: &SimulationConfig) -> Self {
        let mailer = Arc::new(MockMailer::new(Duration::from_millis(config.send_delay_ms)));
        let mut engine = Self::new(mailer)
            .with_max_steps(config.max_steps)
            .with_locale(Locale::parse(&config.locale));
        engine.default_recipient = config.default_recipient.clone();
        engine
    }

    pub fn with_evaluator(mut self, evaluator: ConditionEvaluator) -> Self {
        self.evaluator = Arc::new(evaluator);
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn mailer(&self) -> &Arc<MockMailer> {
        &self.mailer
    }

    /// Runs one walk. The context is consumed, mutated, and handed back in
    /// the report; nothing is shared between runs.
    pub async fn simulate(
        &self,
        chain: &Chain,
        trigger: &Trigger,
        mut context: SimulationContext,
    ) -> SimulationReport {
        let run_id = Uuid::new_v4();
        info!(
            run_id = %run_id,
            nodes = chain.nodes.len(),
            edges = chain.edges.len(),
            trigger = %trigger.trigger_type,
            now = %context.now,
            "Simulation started"
        );
        metrics::counter!("simulation.runs").increment(1);

        seed_legacy_overrides(&mut context);

        let mut trace = Trace::default();
        let starts = matching_starts(chain, trigger, &context.now);
        let Some(start) = starts.first().copied() else {
            trace.log(NO_MATCHING_START);
            return self.finish(run_id, trace, context, WalkOutcome::NoMatchingStart, 0);
        };
        if starts.len() > 1 {
            debug!(run_id = %run_id, ignored = starts.len() - 1, "Several start events matched, using the first");
        }

        if let NodeKind::Event(spec) = start.kind() {
            trace.log(format!("Start at event: {}", spec.event_type));
            if let Some(text) = self.locale.chain_started(&spec.event_type) {
                trace.message(text);
            }
        }

        let mut current = Some(start);
        let mut steps = 0;
        let mut outcome = WalkOutcome::DeadEnd;

        while let Some(node) = current {
            if steps >= self.max_steps {
                break;
            }
            steps += 1;
            debug!(run_id = %run_id, step = steps, node_id = %node.id, "Visiting node");

            match self.step(node, chain, trigger, &mut context, &mut trace).await {
                Next::Goto(target) => {
                    current = navigator::resolve_node(chain, target);
                    if current.is_none() {
                        warn!(run_id = %run_id, from = %node.id, target = %target, "Edge points at a missing node");
                        outcome = WalkOutcome::MissingNode;
                    }
                }
                Next::Halt(reason) => {
                    outcome = reason;
                    current = None;
                }
            }
        }

        if current.is_some() {
            trace.log(SAFETY_LIMIT);
            outcome = WalkOutcome::StepLimit;
        }

        self.finish(run_id, trace, context, outcome, steps)
    }

    async fn step<'a>(
        &self,
        node: &'a Node,
        chain: &'a Chain,
        trigger: &Trigger,
        context: &mut SimulationContext,
        trace: &mut Trace,
    ) -> Next<'a> {
        match node.kind() {
            NodeKind::Event(_) => advance(node, chain),
            NodeKind::Action(action) => {
                match action {
                    ActionSpec::Wait(wait) => self.wait(&wait, context, trace),
                    ActionSpec::SendEmail(email) => {
                        let subject = email.subject.as_deref().unwrap_or(DEFAULT_SUBJECT);
                        let body = email.body.as_deref().unwrap_or(DEFAULT_BODY);
                        self.send_email(node, subject, body, trigger, context, trace)
                            .await;
                    }
                    ActionSpec::Stop => {
                        trace.log(CHAIN_STOPPED);
                        trace.message(self.locale.chain_stopped());
                        return Next::Halt(WalkOutcome::Stopped);
                    }
                    ActionSpec::Unknown(action_type) => {
                        trace.log(format!(
                            "Unknown action: {}",
                            action_type.as_deref().unwrap_or("undefined")
                        ));
                    }
                }
                advance(node, chain)
            }
            NodeKind::Condition(condition) => self.condition(node, &condition, chain, context, trace),
            NodeKind::Unknown(node_type) => {
                trace.log(format!(
                    "Unknown node type: {}",
                    node_type.as_deref().unwrap_or("undefined")
                ));
                Next::Halt(WalkOutcome::UnknownNodeType)
            }
        }
    }

    fn wait(&self, wait: &WaitSpec, context: &mut SimulationContext, trace: &mut Trace) {
        let before = context.now.clone();
        let after = advance_clock(&before, wait.amount, &wait.unit);
        trace.log(format!(
            "Waited {} {}. Time advanced from {} to {}",
            display_value(&wait.raw_value),
            wait.unit.as_str(),
            before,
            after
        ));
        trace.message(self.locale.waited(wait.amount, &wait.unit));
        context.now = after;
    }

    async fn send_email(
        &self,
        node: &Node,
        subject: &str,
        body: &str,
        trigger: &Trigger,
        context: &mut SimulationContext,
        trace: &mut Trace,
    ) {
        let to = trigger
            .payload
            .email
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or(&self.default_recipient)
            .to_string();
        let receipt = self
            .mailer
            .send(&OutboundEmail {
                to: to.clone(),
                subject: subject.to_string(),
                body: body.to_string(),
            })
            .await;

        // Interaction flags seeded before the walk survive the send.
        let prior = context.emails.get(&node.id);
        let record = EmailRecord {
            id: Some(receipt.id.clone()),
            subject: Some(subject.to_string()),
            sent_at: Some(context.now.clone()),
            opened: prior.is_some_and(|r| r.opened),
            clicked: prior.is_some_and(|r| r.clicked),
        };
        context.emails.insert(receipt.id.clone(), record.clone());
        context.emails.insert(node.id.clone(), record);

        trace.log(format!(
            "Sent email to {} (id={}) with subject: \"{}\"",
            to, receipt.id, subject
        ));
        trace.message(self.locale.email_sent(subject));
    }

    fn condition<'a>(
        &self,
        node: &'a Node,
        condition: &ConditionSpec,
        chain: &'a Chain,
        context: &SimulationContext,
        trace: &mut Trace,
    ) -> Next<'a> {
        let holds = self.evaluator.evaluate(condition, context);
        let condition_type = condition.type_name();

        let detail = match condition {
            ConditionSpec::Opened(check) | ConditionSpec::Clicked(check) => {
                if check.wait.is_set() {
                    let w = check.wait;
                    trace.log(format!(
                        "Condition wait: {}d {}m {}s",
                        w.days, w.minutes, w.seconds
                    ));
                    trace.message(self.locale.condition_waited(&w));
                    format!(" wait {}d {}m {}s", w.days, w.minutes, w.seconds)
                } else {
                    String::new()
                }
            }
            ConditionSpec::Date(_) | ConditionSpec::Time(_) | ConditionSpec::Unknown(_) => {
                format!(
                    " {} {}",
                    node.data_str("operator").unwrap_or(""),
                    node.data.get("value").and_then(scalar_text).unwrap_or_default()
                )
            }
        };
        trace.log(format!(
            "Condition ({}{}) → {}",
            condition_type,
            detail,
            if holds { "YES" } else { "NO" }
        ));
        if let Some(text) = self.locale.condition_result(condition_type, holds) {
            trace.message(text);
        }

        let branch = if holds { "yes" } else { "no" };
        match navigator::branch_target(&node.id, &chain.edges, branch) {
            Some(target) => Next::Goto(target),
            None => Next::Halt(WalkOutcome::DeadEnd),
        }
    }

    fn finish(
        &self,
        run_id: Uuid,
        trace: Trace,
        context: SimulationContext,
        outcome: WalkOutcome,
        steps: usize,
    ) -> SimulationReport {
        info!(
            run_id = %run_id,
            outcome = outcome.as_str(),
            steps,
            log_lines = trace.logs.len(),
            "Simulation finished"
        );
        metrics::counter!("simulation.steps").increment(steps as u64);
        metrics::counter!("simulation.outcome", "outcome" => outcome.as_str()).increment(1);

        SimulationReport {
            logs: trace.logs,
            user_messages: trace.user_messages,
            context,
            outcome,
            steps,
        }
    }
}

fn advance<'a>(node: &Node, chain: &'a Chain) -> Next<'a> {
    match navigator::first_target(&node.id, &chain.edges) {
        Some(target) => Next::Goto(target),
        None => Next::Halt(WalkOutcome::DeadEnd),
    }
}

/// Legacy `emailOpened`/`emailClicked` ids mark their emails as interacted
/// with before the walk starts, so conditions see them even ahead of the send.
fn seed_legacy_overrides(context: &mut SimulationContext) {
    if let Some(id) = context.opened_override() {
        context.emails.insert(
            id,
            EmailRecord {
                opened: true,
                ..Default::default()
            },
        );
    }
    if let Some(id) = context.clicked_override() {
        context.emails.entry(id).or_default().clicked = true;
    }
}

/// `now` moved forward by `amount` units. Hours are exact; every other unit
/// counts as calendar days. An unparsable `now` is returned untouched.
fn advance_clock(now: &str, amount: i64, unit: &DelayUnit) -> String {
    let Some(instant) = parse_instant(now) else {
        return now.to_string();
    };
    let shifted = match unit {
        DelayUnit::Hours => add_hours(instant, amount),
        DelayUnit::Days | DelayUnit::Other(_) => add_days(instant, amount),
    };
    shifted
        .map(|t| format_instant(&t))
        .unwrap_or_else(|| now.to_string())
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
