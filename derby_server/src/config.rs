use std::net::{IpAddr, SocketAddr};

use clap::{ArgAction, Parser};
use derby_core::derby_calendar::DEFAULT_TIMEZONE;

#[derive(Debug, Parser)]
#[command(about = "Serve whether today is Kentucky Derby day")]
pub struct Arguments {
    /// the address to listen on
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,
    /// the port to listen on
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,
    /// report error details in responses and log verbosely
    #[arg(long, env = "DERBY_DEBUG")]
    pub debug: bool,
    /// serve the RSS feed at /feed
    #[arg(long, env = "DERBY_FEED", default_value_t = true, action = ArgAction::Set)]
    pub feed: bool,
    /// the host name used in the links of the feed
    #[arg(long, env = "DERBY_PUBLIC_HOST", default_value = "www.isitderby.com")]
    pub public_host: String,
    /// the IANA timezone whose calendar decides Derby day
    #[arg(long, env = "DERBY_TIMEZONE", default_value = DEFAULT_TIMEZONE)]
    pub timezone: String,
}

impl Arguments {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// The settings handlers need at request time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub debug: bool,
    pub feed: bool,
    pub public_host: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            debug: false,
            feed: true,
            public_host: String::from("www.isitderby.com"),
        }
    }
}

impl From<&Arguments> for Settings {
    fn from(value: &Arguments) -> Self {
        Settings {
            debug: value.debug,
            feed: value.feed,
            public_host: value.public_host.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_from_arguments_for_settings() {
        let arguments = Arguments::try_parse_from([
            "derby_server",
            "--host",
            "127.0.0.1",
            "--port",
            "8008",
            "--debug",
            "--feed",
            "false",
            "--public-host",
            "localhost:8008",
        ])
        .unwrap();
        assert_eq!(arguments.socket_addr(), "127.0.0.1:8008".parse::<SocketAddr>().unwrap());
        let settings = Settings::from(&arguments);
        assert_eq!(
            settings,
            Settings {
                debug: true,
                feed: false,
                public_host: String::from("localhost:8008"),
            }
        );
    }

    #[test]
    fn test_invalid_host() {
        assert!(Arguments::try_parse_from(["derby_server", "--host", "derby.local"]).is_err());
    }
}
