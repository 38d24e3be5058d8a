use std::env;
use std::net::SocketAddr;
use std::process;

use calendar_store::TimePolicy;
use getopts::Options;

const ADDRESS_VAR: &str = "CALENDAR_API_ADDR";
const STRICT_TIMES_VAR: &str = "CALENDAR_API_STRICT_TIMES";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub address: SocketAddr,
    pub times: TimePolicy,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Parsed {
    Run(Args),
    Help(String),
}

fn opts() -> Options {
    let mut opts = Options::new();
    opts.optflag(
        "h",
        "help",
        concat!("Print the help output of ", env!("CARGO_PKG_NAME")),
    );
    opts.optopt(
        "a",
        "address",
        "Socket address (IP and port) to listen on [Default: $CALENDAR_API_ADDR or 127.0.0.1:3000]",
        "SOCKET_ADDRESS",
    );
    opts.optflag(
        "s",
        "strict-times",
        "Reject entry times not formatted as `YYYY-MM-DD HH:MM:SS +HHMM` [Default: $CALENDAR_API_STRICT_TIMES or false]",
    );
    opts
}

/// Parses `args` (without the program name), falling back to `var` for
/// anything not given on the command line.
pub fn try_parse<F>(args: Vec<String>, var: F) -> Result<Parsed, String>
where
    F: Fn(&str) -> Option<String>,
{
    let opts = opts();
    let matches = opts.parse(args).map_err(|fail| fail.to_string())?;

    if matches.opt_present("help") {
        return Ok(Parsed::Help(
            opts.usage(&opts.short_usage(env!("CARGO_PKG_NAME"))),
        ));
    }

    let address = match matches.opt_str("address").or_else(|| var(ADDRESS_VAR)) {
        Some(raw) => raw.parse().map_err(|err| {
            format!("Provided value for option 'address' is invalid: {err}")
        })?,
        None => SocketAddr::from(([127, 0, 0, 1], 3000)),
    };

    let strict = matches.opt_present("strict-times")
        || var(STRICT_TIMES_VAR)
            .is_some_and(|value| value == "1" || value.eq_ignore_ascii_case("true"));

    Ok(Parsed::Run(Args {
        address,
        times: if strict {
            TimePolicy::Strict
        } else {
            TimePolicy::Opaque
        },
    }))
}

pub fn parse(args: Vec<String>) -> Args {
    match try_parse(args, |name| env::var(name).ok()) {
        Ok(Parsed::Run(args)) => args,
        Ok(Parsed::Help(usage)) => {
            println!("{usage}");
            process::exit(0);
        }
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults() {
        let parsed = try_parse(args(&[]), no_env).unwrap();
        assert_eq!(
            parsed,
            Parsed::Run(Args {
                address: SocketAddr::from(([127, 0, 0, 1], 3000)),
                times: TimePolicy::Opaque,
            })
        );
    }

    #[test]
    fn flags_override_environment() {
        let env = |name: &str| (name == ADDRESS_VAR).then(|| "0.0.0.0:9000".to_owned());

        let Parsed::Run(parsed) = try_parse(args(&["-a", "127.0.0.1:8080", "-s"]), env).unwrap()
        else {
            panic!("expected run");
        };
        assert_eq!(parsed.address, SocketAddr::from(([127, 0, 0, 1], 8080)));
        assert_eq!(parsed.times, TimePolicy::Strict);
    }

    #[test]
    fn environment_fallback() {
        let env = |name: &str| match name {
            ADDRESS_VAR => Some("0.0.0.0:9000".to_owned()),
            STRICT_TIMES_VAR => Some("TRUE".to_owned()),
            _ => None,
        };

        let Parsed::Run(parsed) = try_parse(args(&[]), env).unwrap() else {
            panic!("expected run");
        };
        assert_eq!(parsed.address, SocketAddr::from(([0, 0, 0, 0], 9000)));
        assert_eq!(parsed.times, TimePolicy::Strict);
    }

    #[test]
    fn invalid_address() {
        let err = try_parse(args(&["--address", "localhost"]), no_env).unwrap_err();
        assert!(err.contains("'address' is invalid"));
    }

    #[test]
    fn help() {
        assert!(matches!(
            try_parse(args(&["--help"]), no_env),
            Ok(Parsed::Help(_))
        ));
    }

    #[test]
    fn unknown_flag() {
        assert!(try_parse(args(&["--cache-ttl", "5"]), no_env).is_err());
    }
}
