//! Conversation routing
//!
//! Classifies each inbound message as a menu command or a new location,
//! strictly in that order: anything in the command vocabulary is never
//! sent to the geocoder, and anything outside it is always treated as a
//! location. There is no "unknown command" state.

use std::sync::Arc;

use eyre::{eyre, Result};
use tracing::{debug, info};

use crate::geo::LocationResolver;
use crate::reply::{
    format_change_location, format_no_session, format_stop, format_welcome, render, ReplyView,
};
use crate::risk::RiskAssessor;

mod session;

pub use session::{Session, SessionStore};

/// Menu actions, each reachable by a digit and a word alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Risk,
    Prep,
    Travel,
    Farm,
    Why,
    Loc,
    Stop,
}

/// Accepted tokens per action. Case-insensitive, whitespace-trimmed.
pub const COMMAND_ALIASES: &[(MenuCommand, &[&str])] = &[
    (MenuCommand::Risk, &["1", "flood", "risk"]),
    (MenuCommand::Prep, &["2", "prep"]),
    (MenuCommand::Travel, &["3", "travel"]),
    (MenuCommand::Farm, &["4", "farm"]),
    (MenuCommand::Why, &["why"]),
    (MenuCommand::Loc, &["5", "loc"]),
    (MenuCommand::Stop, &["stop"]),
];

/// Classify trimmed input as a menu command, or None for "location".
pub fn parse_command(text: &str) -> Option<MenuCommand> {
    let token = text.trim().to_lowercase();
    for (command, aliases) in COMMAND_ALIASES {
        if aliases.contains(&token.as_str()) {
            return Some(*command);
        }
    }
    None
}

/// Startup check: no token may be claimed by two actions.
pub fn validate_alias_table() -> Result<()> {
    let mut seen: Vec<&str> = Vec::new();
    for (command, aliases) in COMMAND_ALIASES {
        for alias in *aliases {
            if seen.contains(alias) {
                return Err(eyre!("command token '{alias}' is claimed twice (second: {command:?})"));
            }
            seen.push(alias);
        }
    }
    Ok(())
}

/// Per-sender conversation state machine.
pub struct ConversationRouter {
    resolver: Arc<LocationResolver>,
    assessor: Arc<RiskAssessor>,
    sessions: SessionStore,
}

impl ConversationRouter {
    /// Wire the full production pipeline from config. Validates the
    /// command table so an alias overlap is caught at startup, not in
    /// the middle of a conversation.
    pub fn from_config(config: &crate::config::Config) -> Result<Self> {
        validate_alias_table()?;
        let resolver = Arc::new(LocationResolver::from_config(config)?);
        let assessor = Arc::new(RiskAssessor::from_config(config)?);
        Ok(Self::new(resolver, assessor))
    }

    pub fn new(resolver: Arc<LocationResolver>, assessor: Arc<RiskAssessor>) -> Self {
        Self {
            resolver,
            assessor,
            sessions: SessionStore::new(),
        }
    }

    /// Handle one inbound message and produce the reply text.
    ///
    /// Infallible: degraded data yields a degraded reply, never an
    /// error to the sender.
    pub async fn handle_message(&self, sender: &str, text: &str) -> String {
        let trimmed = text.trim();
        debug!(%sender, input = %trimmed, "ConversationRouter::handle_message: called");

        if trimmed.is_empty() {
            return format_welcome();
        }

        let entry = self.sessions.entry(sender);
        let mut session = entry.lock().await;

        match parse_command(trimmed) {
            // STOP is a global override: acknowledged in any state
            Some(MenuCommand::Stop) => {
                info!(%sender, "ConversationRouter::handle_message: unsubscribed");
                session.unsubscribed = true;
                format_stop()
            }
            Some(command) => {
                // Inert sessions and sessions with no stored assessment
                // both get the no-session prompt (except the location
                // prompt, which is always safe to show)
                if command == MenuCommand::Loc && !session.unsubscribed {
                    return format_change_location();
                }
                if session.unsubscribed || session.assessment.is_none() {
                    return format_no_session();
                }
                let view = match command {
                    MenuCommand::Risk => ReplyView::Initial,
                    MenuCommand::Prep => ReplyView::HomePrep,
                    MenuCommand::Travel => ReplyView::Travel,
                    MenuCommand::Farm => ReplyView::Farmer,
                    MenuCommand::Why => ReplyView::Why,
                    MenuCommand::Loc | MenuCommand::Stop => unreachable!("handled above"),
                };
                // Stored assessment, no live refresh
                match &session.assessment {
                    Some(assessment) => render(view, assessment),
                    None => format_no_session(),
                }
            }
            // Anything outside the command vocabulary is a location
            None => {
                let location = self.resolver.resolve(trimmed).await;
                let assessment = self.assessor.assess(location).await;
                let reply = render(ReplyView::Initial, &assessment);

                info!(
                    %sender,
                    location = %assessment.location.name,
                    tier = assessment.tier.label(),
                    "ConversationRouter::handle_message: new assessment stored"
                );
                session.location_name = Some(assessment.location.name.clone());
                session.assessment = Some(assessment);
                // A location text re-opts-in after STOP
                session.unsubscribed = false;
                reply
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}
