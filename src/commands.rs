//! Console command grammar
//!
//! The harness drives every player action from one line-oriented grammar:
//! the first word selects the command, the second names the acting player.
//! Parsing is pure; execution lives in the runtime.

use elementum_game::{AbilitySlot, Element, TeamColor};

/// Who may run a command. Dispatch checks this table and refuses admin
/// commands for a plain player caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Player,
    Admin,
}

/// Team sub-commands
#[derive(Debug, Clone, PartialEq)]
pub enum TeamAction {
    Create { team: String },
    Invite { target: String },
    Join { team: String },
    Leave,
    Kick { target: String },
    Disband,
    Rename { team: String },
    Color { color: TeamColor },
    Ally { team: String },
    Unally,
    Info,
}

/// Config sub-commands
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigAction {
    View,
    Set { key: String, value: String },
    Reload,
}

/// One parsed console command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Join { name: String },
    Leave { name: String },
    Die { name: String },
    Roll { name: String, keep_level: bool },
    Use { name: String, slot: AbilitySlot },
    Info { name: String },
    Mana { name: String },
    Trust { name: String, target: String },
    Accept { name: String, requester: String },
    Deny { name: String, requester: String },
    Untrust { name: String, target: String },
    TrustList { name: String },
    Grant { name: String, element: Element },
    Upgrade { name: String },
    Team { name: String, action: TeamAction },
    SetElement { name: String, element: Option<Element> },
    SetLevel { name: String, level: i32 },
    SetMana { name: String, amount: u32 },
    Creative { name: String, enabled: bool },
    Config { action: ConfigAction },
    Save,
    Backup,
    Stats,
    Help,
    Exit,
}

impl Command {
    pub fn permission(&self) -> Permission {
        match self {
            Self::SetElement { .. }
            | Self::SetLevel { .. }
            | Self::SetMana { .. }
            | Self::Grant { .. }
            | Self::Creative { .. }
            | Self::Config { .. }
            | Self::Save
            | Self::Backup
            | Self::Stats => Permission::Admin,
            _ => Permission::Player,
        }
    }

    /// Parse one input line. The error is a usage message for the console.
    pub fn parse(input: &str) -> Result<Self, String> {
        let words: Vec<&str> = input.split_whitespace().collect();
        let (&head, rest) = words.split_first().ok_or_else(|| String::from("empty command"))?;

        match head {
            "join" => one_name(rest, "join <player>").map(|name| Self::Join { name }),
            "leave" => one_name(rest, "leave <player>").map(|name| Self::Leave { name }),
            "die" => one_name(rest, "die <player>").map(|name| Self::Die { name }),
            "roll" => match rest {
                [name] => Ok(Self::Roll { name: name.to_string(), keep_level: false }),
                [name, "keep"] => Ok(Self::Roll { name: name.to_string(), keep_level: true }),
                _ => Err("usage: roll <player> [keep]".to_string()),
            },
            "use" => match rest {
                [name, slot] => {
                    let slot = match *slot {
                        "primary" => AbilitySlot::Primary,
                        "secondary" => AbilitySlot::Secondary,
                        other => return Err(format!("unknown slot '{other}' (primary|secondary)")),
                    };
                    Ok(Self::Use { name: name.to_string(), slot })
                }
                _ => Err("usage: use <player> primary|secondary".to_string()),
            },
            "info" => one_name(rest, "info <player>").map(|name| Self::Info { name }),
            "mana" => one_name(rest, "mana <player>").map(|name| Self::Mana { name }),
            "trust" => two_names(rest, "trust <player> <target>")
                .map(|(name, target)| Self::Trust { name, target }),
            "accept" => two_names(rest, "accept <player> <requester>")
                .map(|(name, requester)| Self::Accept { name, requester }),
            "deny" => two_names(rest, "deny <player> <requester>")
                .map(|(name, requester)| Self::Deny { name, requester }),
            "untrust" => two_names(rest, "untrust <player> <target>")
                .map(|(name, target)| Self::Untrust { name, target }),
            "trusts" => one_name(rest, "trusts <player>").map(|name| Self::TrustList { name }),
            "grant" => match rest {
                [name, element] => {
                    let element = Element::parse(element)
                        .ok_or_else(|| format!("unknown element '{element}'"))?;
                    Ok(Self::Grant { name: name.to_string(), element })
                }
                _ => Err("usage: grant <player> <element>".to_string()),
            },
            "upgrade" => one_name(rest, "upgrade <player>").map(|name| Self::Upgrade { name }),
            "team" => parse_team(rest),
            "set" => match rest {
                [name, "none"] => Ok(Self::SetElement { name: name.to_string(), element: None }),
                [name, element] => {
                    let element = Element::parse(element)
                        .ok_or_else(|| format!("unknown element '{element}'"))?;
                    Ok(Self::SetElement { name: name.to_string(), element: Some(element) })
                }
                _ => Err("usage: set <player> <element|none>".to_string()),
            },
            "level" => match rest {
                [name, level] => {
                    let level: i32 = level.parse().map_err(|_| "level must be a number".to_string())?;
                    Ok(Self::SetLevel { name: name.to_string(), level })
                }
                _ => Err("usage: level <player> <n>".to_string()),
            },
            "manaset" => match rest {
                [name, amount] => {
                    let amount: u32 =
                        amount.parse().map_err(|_| "amount must be a number".to_string())?;
                    Ok(Self::SetMana { name: name.to_string(), amount })
                }
                _ => Err("usage: manaset <player> <amount>".to_string()),
            },
            "creative" => match rest {
                [name, flag] => {
                    let enabled = match *flag {
                        "on" => true,
                        "off" => false,
                        other => return Err(format!("unknown flag '{other}' (on|off)")),
                    };
                    Ok(Self::Creative { name: name.to_string(), enabled })
                }
                _ => Err("usage: creative <player> on|off".to_string()),
            },
            "config" => match rest {
                ["view"] => Ok(Self::Config { action: ConfigAction::View }),
                ["reload"] => Ok(Self::Config { action: ConfigAction::Reload }),
                ["set", key, value] => Ok(Self::Config {
                    action: ConfigAction::Set {
                        key: key.to_string(),
                        value: value.to_string(),
                    },
                }),
                _ => Err("usage: config view | config set <key> <value> | config reload".to_string()),
            },
            "save" => Ok(Self::Save),
            "backup" => Ok(Self::Backup),
            "stats" => Ok(Self::Stats),
            "help" => Ok(Self::Help),
            "exit" | "quit" => Ok(Self::Exit),
            other => Err(format!("unknown command '{other}' (try help)")),
        }
    }

    pub fn help_text() -> &'static str {
        "\
join/leave/die <player>          connect, disconnect, kill
roll <player> [keep]             roll a new element ('keep' keeps the level)
use <player> primary|secondary   fire an ability
info <player>                    element, level, passives
mana <player>                    show the mana pool
trust <player> <target>          send a trust request
accept/deny <player> <requester> answer a trust request
untrust <player> <target>        withdraw trust
trusts <player>                  list trusted players
upgrade <player>                 consume a matching focus to raise the level
team create|invite|join|leave|kick|disband|rename|color|ally|unally|info
grant <player> <element>         [admin] hand out an upgrade focus
set <player> <element|none>      [admin] assign an element directly
level <player> <n>               [admin] set upgrade level
manaset <player> <n>             [admin] set the mana pool
creative <player> on|off         [admin] toggle free-resource mode
config view|set|reload           [admin] inspect or adjust balance values
save / backup / stats            [admin] persistence controls
help / exit"
    }
}

fn one_name(rest: &[&str], usage: &str) -> Result<String, String> {
    match rest {
        [name] => Ok(name.to_string()),
        _ => Err(format!("usage: {usage}")),
    }
}

fn two_names(rest: &[&str], usage: &str) -> Result<(String, String), String> {
    match rest {
        [a, b] => Ok((a.to_string(), b.to_string())),
        _ => Err(format!("usage: {usage}")),
    }
}

fn parse_team(rest: &[&str]) -> Result<Command, String> {
    let usage = "usage: team <action> <player> [args]";
    let (&action, rest) = rest.split_first().ok_or_else(|| usage.to_string())?;
    let (&name, args) = rest.split_first().ok_or_else(|| usage.to_string())?;
    let name = name.to_string();

    let action = match (action, args) {
        ("create", [team]) => TeamAction::Create { team: team.to_string() },
        ("invite", [target]) => TeamAction::Invite { target: target.to_string() },
        ("join", [team]) => TeamAction::Join { team: team.to_string() },
        ("leave", []) => TeamAction::Leave,
        ("kick", [target]) => TeamAction::Kick { target: target.to_string() },
        ("disband", []) => TeamAction::Disband,
        ("rename", [team]) => TeamAction::Rename { team: team.to_string() },
        ("color", [color]) => {
            let color = TeamColor::parse(color).ok_or_else(|| format!("unknown color '{color}'"))?;
            TeamAction::Color { color }
        }
        ("ally", [team]) => TeamAction::Ally { team: team.to_string() },
        ("unally", []) => TeamAction::Unally,
        ("info", []) => TeamAction::Info,
        (other, _) => return Err(format!("unknown team action '{other}'")),
    };
    Ok(Command::Team { name, action })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roll() {
        assert_eq!(
            Command::parse("roll alice"),
            Ok(Command::Roll { name: "alice".to_string(), keep_level: false })
        );
        assert_eq!(
            Command::parse("roll alice keep"),
            Ok(Command::Roll { name: "alice".to_string(), keep_level: true })
        );
    }

    #[test]
    fn test_parse_use_slot() {
        assert_eq!(
            Command::parse("use bob secondary"),
            Ok(Command::Use { name: "bob".to_string(), slot: AbilitySlot::Secondary })
        );
        assert!(Command::parse("use bob tertiary").is_err());
    }

    #[test]
    fn test_parse_set_element() {
        assert_eq!(
            Command::parse("set bob frost"),
            Ok(Command::SetElement { name: "bob".to_string(), element: Some(Element::Frost) })
        );
        assert_eq!(
            Command::parse("set bob none"),
            Ok(Command::SetElement { name: "bob".to_string(), element: None })
        );
        assert!(Command::parse("set bob plasma").is_err());
    }

    #[test]
    fn test_parse_team_actions() {
        assert_eq!(
            Command::parse("team create alice Ravens"),
            Ok(Command::Team {
                name: "alice".to_string(),
                action: TeamAction::Create { team: "Ravens".to_string() }
            })
        );
        assert_eq!(
            Command::parse("team leave alice"),
            Ok(Command::Team { name: "alice".to_string(), action: TeamAction::Leave })
        );
        assert!(Command::parse("team explode alice").is_err());
    }

    #[test]
    fn test_admin_commands_flagged() {
        assert_eq!(Command::parse("save").unwrap().permission(), Permission::Admin);
        assert_eq!(
            Command::parse("roll alice").unwrap().permission(),
            Permission::Player
        );
    }

    #[test]
    fn test_unknown_command_mentions_help() {
        let err = Command::parse("frobnicate").unwrap_err();
        assert!(err.contains("help"));
    }
}
