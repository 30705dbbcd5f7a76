use crate::charset::CharacterClass;
use crate::form::FormState;
use crate::generator::{self, GenerationRequest};
use crate::session;
use crate::validation::{MAX_LENGTH, MIN_LENGTH};
use anyhow::{Context, Result};
use console::{Style, Term};
use std::io;

pub const MIN_SAFE_ENTROPY: f64 = 60.0;
pub const STRONG_ENTROPY: f64 = 80.0;

pub struct DisplayOptions {
    pub unicode_support: bool,
    pub color_support: bool,
    pub quiet: bool,
}

impl DisplayOptions {
    pub fn detect(quiet: bool) -> Self {
        Self {
            unicode_support: detect_unicode_support(),
            color_support: detect_color_support(),
            quiet,
        }
    }

    fn style(&self, secure: bool) -> Style {
        if !self.color_support {
            Style::new()
        } else if secure {
            Style::new().green()
        } else {
            Style::new().yellow()
        }
    }
}

pub fn detect_unicode_support() -> bool {
    supports_unicode::on(supports_unicode::Stream::Stdout)
}

pub fn detect_color_support() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

pub fn get_status_symbols(unicode_support: bool) -> (&'static str, &'static str) {
    if unicode_support {
        ("✓", "!")
    } else {
        ("+", "!")
    }
}

pub fn checkbox(checked: bool, unicode_support: bool) -> &'static str {
    match (checked, unicode_support) {
        (true, true) => "[✓]",
        (true, false) => "[x]",
        (false, _) => "[ ]",
    }
}

/// Label and whether the entropy meets [`MIN_SAFE_ENTROPY`].
pub fn entropy_rating(entropy: f64) -> (&'static str, bool) {
    if entropy >= STRONG_ENTROPY {
        ("Strong", true)
    } else if entropy >= MIN_SAFE_ENTROPY {
        ("Fair", true)
    } else {
        ("Weak", false)
    }
}

fn plural(count: usize, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 { one } else { many }
}

/// Lines of the form as shown at the interactive prompt.
///
/// The generate action is marked disabled while the length field does not
/// validate.
pub fn form_lines(form: &FormState, options: &DisplayOptions) -> Vec<String> {
    let styled = |style: Style| {
        if options.color_support {
            style
        } else {
            Style::new()
        }
    };
    let title = styled(Style::new().bold());
    let error_style = styled(Style::new().red());
    let disabled_style = styled(Style::new().dim());

    let mut lines = vec![format!("{}", title.apply_to("Password Generator"))];

    let length = if form.length_input().is_empty() {
        format!("(Ex. 8, {}-{})", MIN_LENGTH, MAX_LENGTH)
    } else {
        form.length_input().to_string()
    };
    lines.push(format!("  Password Length    {}", length));

    for class in CharacterClass::ALL {
        lines.push(format!(
            "  Include {:<10} {}",
            class.label(),
            checkbox(form.classes().contains(class), options.unicode_support)
        ));
    }

    if let Some(err) = form.error() {
        lines.push(format!("  {}", error_style.apply_to(err)));
    }

    if form.is_valid() {
        lines.push("  g  Generate".to_string());
    } else {
        let hint = format!(
            "g  Generate (disabled: enter a length {}-{})",
            MIN_LENGTH, MAX_LENGTH
        );
        lines.push(format!("  {}", disabled_style.apply_to(hint)));
    }

    lines
}

pub fn render_form(term: &Term, form: &FormState, options: &DisplayOptions) -> Result<()> {
    for line in form_lines(form, options) {
        term.write_line(&line)?;
    }
    Ok(())
}

pub fn display_help(term: &Term) -> Result<()> {
    term.write_line(session::HELP)?;
    Ok(())
}

/// Reads one line after printing `prompt`; `None` once stdin is closed.
pub fn prompt_line(term: &Term, prompt: &str) -> Result<Option<String>> {
    term.write_str(prompt)?;
    term.flush()?;

    let mut input = String::new();
    let read = io::stdin()
        .read_line(&mut input)
        .context("Failed to read from stdin")?;

    if read == 0 {
        return Ok(None);
    }
    Ok(Some(input))
}

pub fn display_output(password: &str, request: &GenerationRequest, options: &DisplayOptions) {
    if options.quiet {
        println!("{}", password);
        return;
    }

    println!("\nResult:\n{}\n", password);
    display_settings(request);
    display_stats(generator::entropy_bits(request), request, options);
}

fn display_settings(request: &GenerationRequest) {
    let classes: Vec<&str> = request.classes.iter().map(CharacterClass::label).collect();

    println!("Settings:");
    println!("  ├─ Classes    {} ({})", classes.len(), classes.join(", "));
    println!("  ├─ Charset    {} chars", request.classes.alphabet_size());
    println!("  └─ Sampling   Uniform, with replacement");
    println!();
}

fn display_stats(entropy: f64, request: &GenerationRequest, options: &DisplayOptions) {
    let (check_ok, check_warn) = get_status_symbols(options.unicode_support);
    let (status_text, secure) = entropy_rating(entropy);
    let style = options.style(secure);
    let status_icon = if secure { check_ok } else { check_warn };
    let length = request.length.get();

    println!("Stats:");
    println!(
        "  ├─ Entropy    {} {} bits ({})",
        style.apply_to(format!("[{}]", status_icon)),
        style.apply_to(format!("{:.1}", entropy)),
        style.apply_to(status_text)
    );
    println!("  └─ Length     {} {}", length, plural(length, "char", "chars"));
}
