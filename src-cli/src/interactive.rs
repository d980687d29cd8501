use dialoguer::{Confirm, Input, Select};
use scorelift_ports::types::{ConversionMode, ConversionRequest};
use std::path::{Path, PathBuf};

pub struct InteractiveChoice {
    pub request: ConversionRequest,
    pub render: bool,
}

pub fn show_welcome() {
    println!("==============================");
    println!("  ScoreLift");
    println!("  PDF score -> MusicXML");
    println!("==============================\n");
}

pub fn prompt_request(default_output_dir: &str) -> Result<InteractiveChoice, dialoguer::Error> {
    let input = ask_input_file()?;
    let output_dir = ask_output_dir(default_output_dir)?;
    let mode = ask_conversion_mode()?;
    let render = mode == ConversionMode::FullAutomatic && ask_render()?;

    Ok(InteractiveChoice {
        request: ConversionRequest::new(input, output_dir, mode),
        render,
    })
}

fn ask_input_file() -> Result<PathBuf, dialoguer::Error> {
    let raw: String = Input::new()
        .with_prompt("Path of the score PDF")
        .validate_with(|input: &String| -> Result<(), String> {
            let path = clean_path(input);
            if Path::new(&path).is_file() {
                Ok(())
            } else {
                Err(format!("'{path}' is not an existing file"))
            }
        })
        .interact_text()?;
    Ok(PathBuf::from(clean_path(&raw)))
}

fn ask_output_dir(default_output_dir: &str) -> Result<PathBuf, dialoguer::Error> {
    let raw: String = Input::new()
        .with_prompt("Output folder for the MusicXML")
        .default(default_output_dir.to_string())
        .interact_text()?;
    Ok(PathBuf::from(clean_path(&raw)))
}

fn ask_conversion_mode() -> Result<ConversionMode, dialoguer::Error> {
    let items = [
        "Full automatic transcription",
        "Transcription with manual correction (assisted mode)",
    ];
    let choice = Select::new()
        .with_prompt("Conversion mode")
        .items(&items)
        .default(0)
        .interact()?;
    Ok(if choice == 0 {
        ConversionMode::FullAutomatic
    } else {
        ConversionMode::ManualAssisted
    })
}

fn ask_render() -> Result<bool, dialoguer::Error> {
    Confirm::new()
        .with_prompt("Render the result to PDF with MuseScore?")
        .default(false)
        .interact()
}

/// Trims whitespace and the quotes file managers add when pasting paths.
fn clean_path(raw: &str) -> String {
    raw.trim().trim_matches('"').trim_matches('\'').to_string()
}

#[cfg(test)]
mod tests {
    use super::clean_path;

    #[test]
    fn strips_pasted_quotes() {
        assert_eq!(clean_path("  \"C:\\Scores\\op 1.pdf\" "), "C:\\Scores\\op 1.pdf");
        assert_eq!(clean_path("'~/a b.pdf'"), "~/a b.pdf");
        assert_eq!(clean_path("plain.pdf"), "plain.pdf");
    }
}
