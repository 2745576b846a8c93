//! Terminal command parsing

use aptfinder_core::ListingFilters;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Start a scrape
    Scrape,
    /// Update some filters; `None` clears that filter
    Filter(FilterUpdate),
    /// Clear every filter
    Clear,
    Refresh,
    /// Show one listing as JSON
    Show(i64),
    Login(String),
    Logout,
    /// Resolve a request path through the edge rewrite
    Route(String),
    Status,
    Help,
    Quit,
}

/// Filter changes from one `filter` command
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterUpdate {
    pub neighborhood: Option<Option<String>>,
    pub max_price: Option<Option<u64>>,
    pub room_count: Option<Option<f64>>,
}

impl FilterUpdate {
    pub fn apply(&self, mut filters: ListingFilters) -> ListingFilters {
        if let Some(neighborhood) = &self.neighborhood {
            filters.neighborhood = neighborhood.clone();
        }
        if let Some(max_price) = self.max_price {
            filters.max_price = max_price;
        }
        if let Some(room_count) = self.room_count {
            filters.room_count = room_count;
        }
        filters
    }
}

pub const HELP: &str = "\
Commands:
  scrape                     start a scrape on the backend
  filter key=value ...       neighborhood=<id> price=<max> rooms=<n>; empty value clears
  clear                      clear all filters
  refresh                    reload stats and listings
  show <id>                  print one listing
  login <token>              store a session token and load the dashboard
  logout                     clear the session
  route <path>               show how the edge rewrites a path
  status                     show the scrape job and filters
  quit                       exit";

impl Command {
    pub fn parse(input: &str) -> Result<Self, String> {
        let input = input.trim();
        let (name, rest) = match input.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (input, ""),
        };

        match name.to_lowercase().as_str() {
            "scrape" | "s" => Ok(Command::Scrape),
            "filter" | "f" => parse_filters(rest).map(Command::Filter),
            "clear" => Ok(Command::Clear),
            "refresh" | "r" => Ok(Command::Refresh),
            "show" => rest
                .parse()
                .map(Command::Show)
                .map_err(|_| format!("Expected a listing id, got '{rest}'")),
            "login" if !rest.is_empty() => Ok(Command::Login(rest.to_string())),
            "login" => Err("Usage: login <token>".to_string()),
            "logout" => Ok(Command::Logout),
            "route" => Ok(Command::Route(rest.to_string())),
            "status" => Ok(Command::Status),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            "" => Err("Type 'help' for commands".to_string()),
            other => Err(format!("Unknown command: {other}")),
        }
    }
}

fn parse_filters(args: &str) -> Result<FilterUpdate, String> {
    if args.is_empty() {
        return Err("Usage: filter neighborhood=<id> price=<max> rooms=<n>".to_string());
    }

    let mut update = FilterUpdate::default();
    for pair in args.split_whitespace() {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("Expected key=value, got '{pair}'"))?;
        let value = value.trim();

        match key.to_lowercase().as_str() {
            "neighborhood" | "n" => {
                update.neighborhood = Some((!value.is_empty()).then(|| value.to_string()));
            }
            "price" | "max_price" => {
                update.max_price = Some(parse_optional(value, "price")?);
            }
            "rooms" => {
                update.room_count = Some(parse_optional(value, "rooms")?);
            }
            other => return Err(format!("Unknown filter: {other}")),
        }
    }

    Ok(update)
}

fn parse_optional<T: std::str::FromStr>(value: &str, what: &str) -> Result<Option<T>, String> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| format!("Invalid {what}: '{value}'"))
}
