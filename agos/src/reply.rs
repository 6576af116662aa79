//! SMS reply formatting
//!
//! Pure functions from an assessment + requested view to bounded-length
//! text. Danger tiers (WARNING/CRITICAL) get an imperative "DO NOW"
//! framing; SAFE/WATCH get a stay-alert framing with the full menu.
//! Every view fits the character budget; over-budget output is truncated
//! on a line boundary rather than silently exceeding it.

use crate::risk::{RiskAssessment, RiskTier};

/// Budget compatible with 3 SMS segments.
pub const MAX_REPLY_CHARS: usize = 480;

const TIER_EMOJI_CRITICAL: &str = "\u{1f534}";
const TIER_EMOJI_WARNING: &str = "\u{1f7e1}";
const TIER_EMOJI_WATCH: &str = "\u{1f7e0}";
const TIER_EMOJI_SAFE: &str = "\u{2705}";

pub const MENU_FOOTER: &str = "Reply:\n1 Risk check\n2 Home prep\n3 Travel\n4 Farmer\nWHY details\nOr text a new location.";
pub const MENU_FOOTER_SHORT: &str = "Reply 1-4, WHY, or a new location.";

/// The views the conversation can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyView {
    Initial,
    Why,
    HomePrep,
    Travel,
    Farmer,
}

/// Render a view of a stored assessment.
pub fn render(view: ReplyView, assessment: &RiskAssessment) -> String {
    let text = match view {
        ReplyView::Initial => format_initial(assessment),
        ReplyView::Why => format_why(assessment),
        ReplyView::HomePrep => format_home_prep(assessment),
        ReplyView::Travel => format_travel(assessment),
        ReplyView::Farmer => format_farmer(assessment),
    };
    enforce_budget(text)
}

fn tier_emoji(tier: RiskTier) -> &'static str {
    match tier {
        RiskTier::Critical => TIER_EMOJI_CRITICAL,
        RiskTier::Warning => TIER_EMOJI_WARNING,
        RiskTier::Watch => TIER_EMOJI_WATCH,
        RiskTier::Safe => TIER_EMOJI_SAFE,
    }
}

fn rain_line(assessment: &RiskAssessment) -> String {
    if assessment.rainfall.available {
        format!(
            "Rain: {} ({:.0}mm) [{}]",
            assessment.rainfall.classification.label(),
            assessment.rainfall.millimeters,
            assessment.rainfall.source.label()
        )
    } else {
        "Rain forecast: Unavailable".to_string()
    }
}

fn susceptibility_line(assessment: &RiskAssessment) -> String {
    if assessment.susceptibility.available {
        format!("Susceptibility: {}", assessment.susceptibility.tier.label())
    } else {
        "Susceptibility: Unknown (assumed Low)".to_string()
    }
}

/// Disclosure line for non-exact matches; empty when the match is exact.
fn approximate_line(assessment: &RiskAssessment) -> Option<String> {
    if assessment.location.approximate {
        Some(format!("Closest match shown: {}", assessment.location.name))
    } else {
        None
    }
}

fn danger_actions(tier: RiskTier) -> &'static [&'static str] {
    match tier {
        RiskTier::Critical => &[
            "EVACUATE to higher ground NOW.",
            "Bring IDs, meds, water, phone.",
            "Turn off main power before leaving.",
            "Do NOT cross floodwater.",
        ],
        _ => &[
            "Charge phone and powerbank.",
            "Move valuables to higher floor.",
            "Pack go-bag: IDs, meds, water, clothes.",
            "Monitor for rising water levels.",
        ],
    }
}

/// Initial assessment reply: banner, data lines, actions, menu.
pub fn format_initial(assessment: &RiskAssessment) -> String {
    let emoji = tier_emoji(assessment.tier);
    let loc = assessment.location.name.to_uppercase();

    let mut lines = vec![
        format!("{emoji} FLOOD {} | {loc}", assessment.tier.label()),
        rain_line(assessment),
        susceptibility_line(assessment),
    ];
    if let Some(disclosure) = approximate_line(assessment) {
        lines.push(disclosure);
    }
    lines.push(String::new());

    match assessment.tier {
        RiskTier::Critical | RiskTier::Warning => {
            lines.push("DO NOW:".to_string());
            for (i, action) in danger_actions(assessment.tier).iter().enumerate() {
                lines.push(format!("{}. {action}", i + 1));
            }
            lines.push(String::new());
            lines.push(MENU_FOOTER_SHORT.to_string());
        }
        RiskTier::Watch => {
            lines.push("Stay alert. No immediate action needed.".to_string());
            lines.push(String::new());
            lines.push(MENU_FOOTER.to_string());
        }
        RiskTier::Safe => {
            lines.push(MENU_FOOTER.to_string());
        }
    }

    lines.join("\n")
}

/// WHY view: the literal numeric breakdown behind the tier.
pub fn format_why(assessment: &RiskAssessment) -> String {
    let emoji = tier_emoji(assessment.tier);
    let loc = assessment.location.name.to_uppercase();

    let suscept_line = if assessment.susceptibility.available {
        format!(
            "Flood susceptibility: {} ({}/4)\n  Source: MGB (Mines and Geosciences Bureau)",
            assessment.susceptibility.tier.label(),
            assessment.susceptibility.tier.value()
        )
    } else {
        format!(
            "Flood susceptibility: Unknown, assumed {} ({}/4)\n  Source: unavailable",
            assessment.susceptibility.tier.label(),
            assessment.susceptibility.tier.value()
        )
    };

    let lines = [
        format!("{emoji} WHY {} | {loc}", assessment.tier.label()),
        String::new(),
        format!(
            "Rainfall: {:.0}mm ({})",
            assessment.rainfall.millimeters,
            assessment.rainfall.classification.label()
        ),
        format!("  Source: {}", assessment.rainfall.source.label()),
        format!("  {}", assessment.rainfall.detail),
        String::new(),
        suscept_line,
        String::new(),
        format!(
            "Risk score: {} x {} = {}",
            assessment.susceptibility.tier.value(),
            assessment.rain_trigger,
            assessment.score
        ),
        "Thresholds: 0=SAFE, 1-3=WATCH, 4-6=WARNING, 7+=CRITICAL".to_string(),
        String::new(),
        MENU_FOOTER_SHORT.to_string(),
    ];
    lines.join("\n")
}

fn checklist(title: &str, assessment: &RiskAssessment, items: &[&str], extra: Option<String>) -> String {
    let emoji = tier_emoji(assessment.tier);
    let loc = assessment.location.name.to_uppercase();

    let mut lines = vec![format!("{emoji} {title} | {loc} ({})", assessment.tier.label())];
    if let Some(extra) = extra {
        lines.push(extra);
    }
    lines.push(String::new());
    for (i, item) in items.iter().enumerate() {
        lines.push(format!("{}. {item}", i + 1));
    }
    lines.push(String::new());
    lines.push(MENU_FOOTER_SHORT.to_string());
    lines.join("\n")
}

/// Menu 2: home preparation checklist, tailored to the tier.
pub fn format_home_prep(assessment: &RiskAssessment) -> String {
    let items: &[&str] = match assessment.tier {
        RiskTier::Critical => &[
            "If still home - LEAVE NOW.",
            "Turn off electricity and gas.",
            "Seal important documents in plastic.",
            "Move to evacuation center or higher ground.",
        ],
        RiskTier::Warning => &[
            "Move valuables and electronics upstairs.",
            "Fill containers with clean drinking water.",
            "Charge all phones and powerbanks.",
            "Pack go-bag: IDs, meds, water, clothes.",
            "Know your evacuation route.",
        ],
        RiskTier::Watch => &[
            "Check flashlights and batteries.",
            "Stock 3 days of food and water.",
            "Secure loose items outside.",
            "Keep phone charged.",
        ],
        RiskTier::Safe => &[
            "No urgent prep needed.",
            "Good time to restock emergency supplies.",
            "Check that your go-bag is ready (IDs, meds, water).",
        ],
    };
    checklist("HOME PREP", assessment, items, None)
}

/// Menu 3: travel safety advice.
pub fn format_travel(assessment: &RiskAssessment) -> String {
    let items: &[&str] = match assessment.tier {
        RiskTier::Critical => &[
            "DO NOT TRAVEL. Roads may be impassable.",
            "Do not cross flooded roads on foot or by vehicle.",
            "If caught in rising water, move to highest accessible point.",
            "Wait for official all-clear before traveling.",
        ],
        RiskTier::Warning => &[
            "Avoid low-lying roads and underpasses.",
            "Delay non-essential travel.",
            "If driving, do not enter flooded roads - turn around.",
            "Keep phone charged for updates.",
        ],
        RiskTier::Watch => &[
            "Travel with caution near rivers and waterways.",
            "Avoid low-lying routes if heavy rain starts.",
            "Keep updated on weather advisories.",
        ],
        RiskTier::Safe => &["Travel conditions are normal.", "Stay aware of weather changes."],
    };
    checklist("TRAVEL", assessment, items, None)
}

/// Menu 4: farmer/agriculture advice.
pub fn format_farmer(assessment: &RiskAssessment) -> String {
    let items: &[&str] = match assessment.tier {
        RiskTier::Critical => &[
            "Prioritize personal safety over crops/livestock.",
            "Move livestock to higher ground immediately.",
            "Secure or harvest what you can NOW.",
            "Do not work in open fields.",
        ],
        RiskTier::Warning => &[
            "Delay planting if heavy rain expected.",
            "Move equipment and supplies to higher ground.",
            "Secure livestock shelters.",
            "Harvest ripe crops before heavy rain hits.",
        ],
        RiskTier::Watch => &[
            "Monitor forecasts before field work.",
            "Delay fertilizer application if rain is expected.",
            "Check drainage ditches are clear.",
        ],
        RiskTier::Safe => &[
            "Good conditions for field work.",
            "Good time to maintain drainage systems.",
            "Check weather before scheduling irrigation.",
        ],
    };
    checklist("FARMER", assessment, items, Some(rain_line(assessment)))
}

/// Reply when a menu command arrives with no stored assessment.
pub fn format_no_session() -> String {
    "No location on file.\nText a city name to get started.\nExample: Marikina".to_string()
}

/// Reply to the change-location command.
pub fn format_change_location() -> String {
    "Send a new city or barangay name to update your location.".to_string()
}

/// Reply to STOP.
pub fn format_stop() -> String {
    "You've been unsubscribed. Text any city name to start again.".to_string()
}

/// Reply to an empty first message.
pub fn format_welcome() -> String {
    format!("Send a location (e.g. 'Brgy Lahug, Cebu City') to get started.\n\n{MENU_FOOTER}")
}

/// Keep a reply inside [`MAX_REPLY_CHARS`]: first downgrade a full menu
/// footer to the short one, then truncate on a line boundary.
fn enforce_budget(text: String) -> String {
    if text.chars().count() <= MAX_REPLY_CHARS {
        return text;
    }

    let downgraded = text.replace(MENU_FOOTER, MENU_FOOTER_SHORT);
    if downgraded.chars().count() <= MAX_REPLY_CHARS {
        return downgraded;
    }

    let mut kept = String::new();
    for line in downgraded.lines() {
        let candidate_len = kept.chars().count() + line.chars().count() + usize::from(!kept.is_empty());
        if candidate_len > MAX_REPLY_CHARS {
            break;
        }
        if !kept.is_empty() {
            kept.push('\n');
        }
        kept.push_str(line);
    }
    kept
}
