//! Interactive session commands and output formatting

use crate::error::CliError;
use ambience_playback::{PlaybackEvent, PlaybackStatus, SoundCatalog, SoundDescriptor};
use std::str::FromStr;

/// One line of session input
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// Play a sound by name
    Play(String),
    Stop,
    /// Volume as a 0-100 slider position (out-of-range values are clamped)
    Volume(f32),
    Status,
    List,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = CliError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match (verb.to_ascii_lowercase().as_str(), rest) {
            ("play", "") => Err(CliError::InvalidCommand("play needs a sound name".into())),
            ("play", name) => Ok(SessionCommand::Play(name.to_string())),
            ("volume" | "vol", value) => value
                .parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .map(SessionCommand::Volume)
                .ok_or_else(|| CliError::InvalidCommand(format!("volume needs 0-100, got '{}'", value))),
            ("stop", "") => Ok(SessionCommand::Stop),
            ("status", "") => Ok(SessionCommand::Status),
            ("list", "") => Ok(SessionCommand::List),
            ("quit" | "exit", "") => Ok(SessionCommand::Quit),
            _ => Err(CliError::InvalidCommand(line.to_string())),
        }
    }
}

/// Find a sound by exact name, then case-insensitively
pub fn lookup<'a>(catalog: &'a SoundCatalog, name: &str) -> Option<&'a SoundDescriptor> {
    catalog.find(name).or_else(|| {
        catalog
            .list_sounds()
            .iter()
            .find(|sound| sound.name.eq_ignore_ascii_case(name))
    })
}

/// One catalog line for listings
pub fn describe_sound(sound: &SoundDescriptor) -> String {
    format!("{} {:<12} {}", sound.icon, sound.name, sound.description)
}

pub fn describe_event(event: &PlaybackEvent) -> String {
    match event {
        PlaybackEvent::Loading { sound } => format!("Loading {} {}...", sound.icon, sound.name),
        PlaybackEvent::Started { sound } => format!("Playing {} {}", sound.icon, sound.name),
        PlaybackEvent::Stopped { sound } => format!("Stopped {}", sound.name),
        PlaybackEvent::VolumeChanged { volume } => {
            format!("Volume {}%", (volume * 100.0).round() as u8)
        }
        PlaybackEvent::Error { sound, message } => {
            format!("Could not play {}: {}", sound.name, message)
        }
    }
}

pub fn describe_status(status: &PlaybackStatus) -> String {
    let volume = (status.volume * 100.0).round() as u8;

    match (&status.sound, status.playing) {
        (Some(sound), true) => format!("{} {} playing, volume {}%", sound.icon, sound.name, volume),
        (Some(sound), false) => format!("{} {} paused, volume {}%", sound.icon, sound.name, volume),
        (None, _) => format!("Nothing playing, volume {}%", volume),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(
            "play White Noise".parse::<SessionCommand>().unwrap(),
            SessionCommand::Play("White Noise".into())
        );
        assert_eq!(
            "  PLAY   rain ".parse::<SessionCommand>().unwrap(),
            SessionCommand::Play("rain".into())
        );
        assert_eq!("stop".parse::<SessionCommand>().unwrap(), SessionCommand::Stop);
        assert_eq!(
            "volume 75".parse::<SessionCommand>().unwrap(),
            SessionCommand::Volume(75.0)
        );
        assert_eq!("status".parse::<SessionCommand>().unwrap(), SessionCommand::Status);
        assert_eq!("exit".parse::<SessionCommand>().unwrap(), SessionCommand::Quit);
    }

    #[test]
    fn out_of_range_volume_is_accepted() {
        // The engine clamps
        assert_eq!(
            "volume -5".parse::<SessionCommand>().unwrap(),
            SessionCommand::Volume(-5.0)
        );
        assert_eq!(
            "volume 200".parse::<SessionCommand>().unwrap(),
            SessionCommand::Volume(200.0)
        );
    }

    #[test]
    fn rejects_malformed_commands() {
        assert!("play".parse::<SessionCommand>().is_err());
        assert!("volume loud".parse::<SessionCommand>().is_err());
        assert!("volume NaN".parse::<SessionCommand>().is_err());
        assert!("stop now".parse::<SessionCommand>().is_err());
        assert!("dance".parse::<SessionCommand>().is_err());
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let catalog = SoundCatalog::builtin();

        assert_eq!(lookup(catalog, "Ocean").unwrap().name, "Ocean");
        assert_eq!(lookup(catalog, "white noise").unwrap().name, "White Noise");
        assert!(lookup(catalog, "thunder").is_none());
    }

    #[test]
    fn describes_status() {
        let rain = SoundCatalog::builtin().find("Rain").unwrap().clone();

        let playing = PlaybackStatus {
            sound: Some(rain.clone()),
            playing: true,
            volume: 0.5,
        };
        assert_eq!(
            describe_status(&playing),
            format!("{} Rain playing, volume 50%", rain.icon)
        );

        let idle = PlaybackStatus {
            sound: None,
            playing: false,
            volume: 0.25,
        };
        assert_eq!(describe_status(&idle), "Nothing playing, volume 25%");
    }

    #[test]
    fn describes_events() {
        let birds = SoundCatalog::builtin().find("Birds").unwrap().clone();

        assert_eq!(
            describe_event(&PlaybackEvent::Started {
                sound: birds.clone()
            }),
            format!("Playing {} Birds", birds.icon)
        );
        assert_eq!(
            describe_event(&PlaybackEvent::VolumeChanged { volume: 0.8 }),
            "Volume 80%"
        );
    }
}
