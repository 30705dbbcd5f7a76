use anyhow::{Context, Result};
use clap::Parser;
use console::Term;
use log::{debug, info};
use passgen::session::{self, Command};
use passgen::ui::{self, DisplayOptions};
use passgen::{Action, CharacterClass, ClassSet, FormState, Keystream};
use rand::RngCore;

#[derive(Parser)]
#[command(
    name = "passgen",
    version,
    author,
    about = "Random password generator over selectable character classes"
)]
struct Cli {
    /// Password length (4-16); starts the interactive form when omitted
    #[arg(short, long)]
    length: Option<String>,

    /// Leave lowercase letters out
    #[arg(long)]
    no_lowercase: bool,

    /// Include uppercase letters
    #[arg(short, long)]
    uppercase: bool,

    /// Include digits
    #[arg(short, long)]
    digits: bool,

    /// Include symbols
    #[arg(short, long)]
    symbols: bool,

    /// Include every character class
    #[arg(short, long, conflicts_with = "no_lowercase")]
    all: bool,

    /// Derive output from a seed phrase so runs are reproducible
    #[arg(long)]
    seed: Option<String>,

    /// Print only the password
    #[arg(short, long)]
    quiet: bool,

    /// Run the interactive form even when a length is given
    #[arg(short, long)]
    interactive: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Classes selected by the flags; lowercase is on unless `--no-lowercase`.
    fn classes(&self) -> ClassSet {
        if self.all {
            return ClassSet::all();
        }

        let mut classes = ClassSet::empty();
        let flags = [
            (CharacterClass::Lowercase, !self.no_lowercase),
            (CharacterClass::Uppercase, self.uppercase),
            (CharacterClass::Digit, self.digits),
            (CharacterClass::Symbol, self.symbols),
        ];
        for (class, enabled) in flags {
            if enabled {
                classes.insert(class);
            }
        }
        classes
    }

    fn initial_form(&self) -> FormState {
        let mut form = FormState::new();

        let wanted = self.classes();
        for class in CharacterClass::ALL {
            if wanted.contains(class) != form.classes().contains(class) {
                form.toggle_class(class);
            }
        }

        if let Some(length) = &self.length {
            form.set_length(length.as_str());
        }
        form
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn run_once(form: &mut FormState, rng: &mut dyn RngCore, options: &DisplayOptions) -> Result<()> {
    form.submit(rng).context("Cannot generate password")?;

    let request = form.request()?;
    if let Some(password) = form.password() {
        ui::display_output(password, &request, options);
    }
    Ok(())
}

fn run_interactive(
    form: &mut FormState,
    rng: &mut dyn RngCore,
    options: &DisplayOptions,
) -> Result<()> {
    let term = Term::stdout();
    ui::display_help(&term)?;

    loop {
        term.write_line("")?;
        ui::render_form(&term, form, options)?;

        let Some(line) = ui::prompt_line(&term, "> ")? else {
            break;
        };

        let action = match session::parse_command(&line) {
            Ok(Command::Form(action)) => action,
            Ok(Command::Help) => {
                ui::display_help(&term)?;
                continue;
            }
            Ok(Command::Quit) => break,
            Err(err) => {
                term.write_line(&err.to_string())?;
                continue;
            }
        };

        let submitted = action == Action::Submit;
        if let Err(err) = form.dispatch(action, rng) {
            // kept on the form and rendered on the next pass
            debug!("action failed: {}", err);
            continue;
        }

        if submitted {
            let request = form.request()?;
            if let Some(password) = form.password() {
                ui::display_output(password, &request, options);
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = DisplayOptions::detect(cli.quiet);
    let mut form = cli.initial_form();

    let mut rng: Box<dyn RngCore> = match &cli.seed {
        Some(seed) => {
            info!("using seeded keystream");
            Box::new(Keystream::from_seed_phrase(seed))
        }
        None => Box::new(rand::thread_rng()),
    };

    if cli.interactive || cli.length.is_none() {
        run_interactive(&mut form, rng.as_mut(), &options)
    } else {
        run_once(&mut form, rng.as_mut(), &options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use passgen::{FormError, GenerateError, LengthError};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("passgen").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_default_flags_select_lowercase() {
        let cli = parse(&["-l", "8"]);
        assert_eq!(cli.classes(), ClassSet::default());
        assert_eq!(cli.initial_form().classes(), ClassSet::default());
        assert_eq!(cli.initial_form().length_input(), "8");
    }

    #[test]
    fn test_no_lowercase_with_digits() {
        let cli = parse(&["-l", "8", "-q", "--no-lowercase", "-d"]);
        let expected = ClassSet::empty().with(CharacterClass::Digit);
        assert_eq!(cli.initial_form().classes(), expected);

        let mut rng = StdRng::seed_from_u64(8);
        let mut form = cli.initial_form();
        let password = form.submit(&mut rng).unwrap();
        assert_eq!(password.len(), 8);
        assert!(password.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_all_flag() {
        let cli = parse(&["-l", "8", "--all"]);
        assert_eq!(cli.initial_form().classes(), ClassSet::all());

        let cli = parse(&["-l", "8", "-a", "-u"]);
        assert_eq!(cli.classes(), ClassSet::all());
    }

    #[test]
    fn test_individual_class_flags() {
        let cli = parse(&["-l", "10", "-u", "-s"]);
        let expected = ClassSet::default()
            .with(CharacterClass::Uppercase)
            .with(CharacterClass::Symbol);
        assert_eq!(cli.initial_form().classes(), expected);
    }

    #[test]
    fn test_no_lowercase_alone_fails_to_generate() {
        let cli = parse(&["-l", "8", "--no-lowercase"]);
        let mut form = cli.initial_form();
        assert!(form.classes().is_empty());

        let mut rng = StdRng::seed_from_u64(8);
        let err = form.submit(&mut rng).unwrap_err();
        assert_eq!(err, FormError::Generate(GenerateError::NoCharacterClass));
    }

    #[test]
    fn test_all_conflicts_with_no_lowercase() {
        let args = ["passgen", "-l", "8", "--all", "--no-lowercase"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_invalid_length_flag_is_reported_by_form() {
        let cli = parse(&["-l", "20"]);
        let mut form = cli.initial_form();
        assert!(!form.is_valid());

        let mut rng = StdRng::seed_from_u64(8);
        let err = form.submit(&mut rng).unwrap_err();
        assert_eq!(err, FormError::Length(LengthError::TooLong(20)));
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let cli = parse(&["-l", "16", "--all", "--seed", "demo"]);
        let seed = cli.seed.as_deref().unwrap();

        let mut first = cli.initial_form();
        let mut second = cli.initial_form();
        let a = first
            .submit(&mut Keystream::from_seed_phrase(seed))
            .unwrap()
            .to_string();
        let b = second
            .submit(&mut Keystream::from_seed_phrase(seed))
            .unwrap()
            .to_string();
        assert_eq!(a, b);
    }
}
