use std::env;

use anyhow::{bail, Context, Result};
use serenity::all::GuildId;

pub const DISCORD_BOT_TOKEN: &str = "DISCORD_BOT_TOKEN";

#[derive(Clone, Debug)]
pub struct BotConfig {
    pub discord_token: String,
    /// Register commands on this guild only instead of globally.
    pub guild_id: Option<GuildId>,
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = lookup(DISCORD_BOT_TOKEN)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .with_context(|| format!("{} must be set", DISCORD_BOT_TOKEN))?;

        let guild_id = match lookup("DISCORD_GUILD_ID").filter(|v| !v.trim().is_empty()) {
            Some(raw) => {
                let id: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("DISCORD_GUILD_ID is not a snowflake: {}", raw))?;
                if id == 0 {
                    bail!("DISCORD_GUILD_ID must be non-zero");
                }
                Some(GuildId::new(id))
            }
            None => None,
        };

        Ok(Self {
            discord_token,
            guild_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_required() {
        let err = BotConfig::from_lookup(|_| None).unwrap_err();
        assert!(err.to_string().contains(DISCORD_BOT_TOKEN));
        assert!(BotConfig::from_lookup(|_| Some("  ".to_string())).is_err());
    }

    #[test]
    fn guild_id_is_optional_but_validated() {
        let cfg = BotConfig::from_lookup(|key| match key {
            DISCORD_BOT_TOKEN => Some("abc".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(cfg.discord_token, "abc");
        assert!(cfg.guild_id.is_none());

        let cfg = BotConfig::from_lookup(|key| match key {
            DISCORD_BOT_TOKEN => Some("abc".to_string()),
            "DISCORD_GUILD_ID" => Some("123456789012345678".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(cfg.guild_id, Some(GuildId::new(123456789012345678)));

        let bad = BotConfig::from_lookup(|key| match key {
            DISCORD_BOT_TOKEN => Some("abc".to_string()),
            "DISCORD_GUILD_ID" => Some("geral".to_string()),
            _ => None,
        });
        assert!(bad.is_err());
    }
}
