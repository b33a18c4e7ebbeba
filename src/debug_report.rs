use intentio::{ActionType, ActivatedAction, ActivatedFilter, ResolutionVerbose, RoundTrace, StopReason};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_run(res: &ResolutionVerbose, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Resolving: \"{}\"", res.query), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Rounds ━━━", ansi::GRAY));
    for round in &res.details.rounds {
        print_round(round, &palette);
    }

    println!("\n{}", palette.paint("━━━ Activations ━━━", ansi::GRAY));
    if res.actions.is_empty() {
        println!("{}", palette.dim("  No intent fired"));
        println!("\n{}", palette.paint("Possible reasons:", ansi::YELLOW));
        println!("  • No trigger text occurs in the query (PHRASE_MATCH is case-sensitive)");
        println!("  • The request context excluded the candidate intents");
        println!("  • A REGEX trigger failed to compile (see warnings on stderr)");
        println!("\n{}", palette.dim("  Tip: Set INTENTIO_LOG=trace to see every pass"));
    } else {
        for (idx, action) in res.actions.iter().enumerate() {
            print_action(idx, action, &palette);
        }
    }

    println!("\n{}", palette.paint("━━━ Outcome ━━━", ansi::GRAY));
    let final_query = res.actions.last().map_or(res.query.as_str(), |a| a.modified_query.as_str());
    println!("  {} {}", palette.dim("query:"), palette.bold(palette.paint(format!("\"{final_query}\""), ansi::GREEN)));
    println!(
        "  {} {}  {} {}",
        palette.dim("stop:"),
        fmt_stop(res.details.stop, &palette),
        palette.dim("│ intents:"),
        palette.paint(res.details.intents.to_string(), ansi::BLUE)
    );

    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    println!(
        "  Total: {}  │  Rounds: {}",
        palette.paint(format!("{:?}", res.details.total), ansi::GREEN),
        palette.paint(res.details.rounds.len().to_string(), ansi::CYAN),
    );
    println!();
}

fn print_round(round: &RoundTrace, palette: &ansi::Palette) {
    let label = palette.paint(format!("Round {}:", round.round), ansi::BLUE);
    let outcome = match (round.match_type, round.intent, &round.trigger) {
        (Some(match_type), Some(intent), Some(trigger)) => {
            palette.paint(format!("✓ {intent} via {match_type} \"{trigger}\""), ansi::GREEN)
        }
        _ => palette.dim("✗ no trigger fired"),
    };
    println!("  {label} {outcome}  {}", palette.dim(format!("{:?}", round.duration)));
    println!("    {}", palette.dim(format!("\"{}\"", round.query)));
}

fn print_action(idx: usize, action: &ActivatedAction, palette: &ansi::Palette) {
    println!(
        "  {} {} {} {}",
        palette.paint(format!("[{}]", idx), ansi::GRAY),
        palette.bold(palette.paint(format!("{:?}", action.action_type).to_uppercase(), ansi::GREEN)),
        palette.dim("│"),
        palette.paint(action.intent_id.to_string(), ansi::YELLOW),
    );

    match action.action_type {
        ActionType::Redirect => {
            let target = action.redirect.as_deref().unwrap_or("");
            println!("      {} {}", palette.dim("redirect:"), palette.paint(target, ansi::RED));
        }
        ActionType::Rewrite | ActionType::Definition => {
            for filter in &action.filters {
                println!("      {} {}", palette.dim("filter:"), fmt_filter(filter, palette));
            }
            if let Some(sort) = &action.sort {
                println!(
                    "      {} {} {}",
                    palette.dim("sort:"),
                    palette.paint(&sort.key, ansi::BLUE),
                    palette.dim(format!("{:?}", sort.direction).to_uppercase())
                );
            }
            let query = format!("\"{}\"", action.modified_query);
            println!("      {} {}", palette.dim("query:"), palette.paint(query, ansi::CYAN));
        }
    }
}

fn fmt_filter(filter: &ActivatedFilter, palette: &ansi::Palette) -> String {
    let mut parts = Vec::new();
    if !filter.values.is_empty() {
        parts.push(format!("= {}", filter.values.join(", ")));
    }
    match (filter.min, filter.max) {
        (Some(min), Some(max)) => parts.push(format!("{min}..{max}")),
        (Some(min), None) => parts.push(format!("≥ {min}")),
        (None, Some(max)) => parts.push(format!("≤ {max}")),
        (None, None) => {}
    }
    if let Some(unit) = &filter.unit {
        parts.push(unit.clone());
    }
    if let Some(value) = filter.boolean_value {
        parts.push(format!("is {value}"));
    }
    if filter.without == Some(true) {
        parts.push("(without)".to_string());
    }

    format!("{} {}", palette.paint(&filter.key, ansi::BLUE), palette.paint(parts.join(" "), ansi::YELLOW))
}

fn fmt_stop(stop: StopReason, palette: &ansi::Palette) -> String {
    match stop {
        StopReason::NoMatch => palette.paint(stop.as_str(), ansi::GREEN),
        StopReason::Redirect => palette.paint(stop.as_str(), ansi::CYAN),
        StopReason::RoundLimit => palette.paint(format!("{} (check for cyclic rewrites)", stop.as_str()), ansi::RED),
    }
}
