//! Rule selection and trigger predicate evaluation.
//!
//! Matching is pure: candidate filtering looks only at rule metadata and the
//! event, predicate evaluation looks only at the trigger config and the event
//! payload. A predicate that fails to evaluate (for example an invalid regex)
//! yields a skip for that one rule, never a matcher failure.

use regex::Regex;

use crate::automation::event::LifecycleEvent;
use crate::automation::rule::{AutomationRule, RuleStore, TriggerConfig};
use crate::{dlog_trace, Error, Result};

/// Outcome of evaluating one rule's trigger against an event.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// Trigger matched; the action should run.
    Matched,
    /// Trigger did not match; the rule is ignored for this event.
    NotMatched,
    /// Predicate evaluation failed; recorded as skipped.
    EvaluationFailed(String),
}

/// Stateless matcher over a [`RuleStore`].
pub struct RuleMatcher;

impl RuleMatcher {
    /// Candidate rules for an event: active, scope admits the event's
    /// project, and the trigger type matches the event kind. Returned in
    /// creation order (id tie-break), so execution is deterministic.
    pub fn candidates<'a>(
        store: &'a RuleStore,
        event: &LifecycleEvent,
    ) -> Vec<&'a AutomationRule> {
        store
            .ids_for_kind(event.kind())
            .iter()
            .filter_map(|id| store.get(*id))
            .filter(|rule| rule.is_active && rule.scope.admits(event.project()))
            .collect()
    }

    /// Evaluate one rule's trigger predicate against the event payload.
    pub fn evaluate(rule: &AutomationRule, event: &LifecycleEvent) -> MatchOutcome {
        match Self::predicate(&rule.trigger, event) {
            Ok(true) => MatchOutcome::Matched,
            Ok(false) => MatchOutcome::NotMatched,
            Err(e) => MatchOutcome::EvaluationFailed(e.to_string()),
        }
    }

    fn predicate(trigger: &TriggerConfig, event: &LifecycleEvent) -> Result<bool> {
        let matched = match (trigger, event) {
            (
                TriggerConfig::TaskCreated { name_matches },
                LifecycleEvent::TaskCreated { name, .. },
            ) => match name_matches {
                Some(pattern) => {
                    let re = Regex::new(pattern)
                        .map_err(|e| Error::TriggerEvaluation(e.to_string()))?;
                    re.is_match(name)
                }
                None => true,
            },
            (
                TriggerConfig::StatusChanged { from, to },
                LifecycleEvent::TaskStatusChanged {
                    from: event_from,
                    to: event_to,
                    ..
                },
            ) => {
                from.map_or(true, |f| f == *event_from) && to.map_or(true, |t| t == *event_to)
            }
            (TriggerConfig::TaskUnblocked, LifecycleEvent::TaskUnblocked { .. }) => true,
            (
                TriggerConfig::DependencyAdded { kind },
                LifecycleEvent::DependencyAdded { edge, .. },
            ) => kind.map_or(true, |k| k == edge.kind),
            (TriggerConfig::DependencyRemoved, LifecycleEvent::DependencyRemoved { .. }) => true,
            (TriggerConfig::ProjectUpdated, LifecycleEvent::ProjectUpdated { .. }) => true,
            (
                TriggerConfig::DueDateApproaching { within_hours },
                LifecycleEvent::DueDateThresholdCrossed { lead_hours, .. },
            ) => lead_hours <= within_hours,
            // Trigger type and event kind disagree; candidates() filters
            // these out, but the predicate stays total.
            _ => false,
        };
        dlog_trace!("predicate {:?} over {} -> {}", trigger, event.kind(), matched);
        Ok(matched)
    }
}
