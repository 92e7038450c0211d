use crate::too::request::{
    default_exposure_just, format_uvot_mode, parse_uvot_mode, urgency_rules, TooRequest,
    DEFAULT_MONITORING_FREQ, DEFAULT_NUM_OF_VISITS, DEFAULT_OBS_TYPE, DEFAULT_OPT_FILT,
    DEFAULT_SCIENCE_JUST, DEFAULT_SOURCE_TYPE, DEFAULT_URGENCY, DEFAULT_UVOT_JUST,
    DEFAULT_UVOT_MODE, OBS_TYPES,
};
use anyhow::{bail, Context};
use std::fmt::Display;
use std::io::{BufRead, Write};
use std::str::FromStr;

/// Asks questions on `output` and reads answers from `input`.
///
/// An empty answer takes the offered default. Unparseable answers are asked again.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_line(&mut self) -> anyhow::Result<String> {
        let mut line = String::new();
        let read = self.input.read_line(&mut line).context("reading answer")?;
        if read == 0 {
            bail!("input closed before the request was complete");
        }
        Ok(line.trim().to_string())
    }

    pub fn text(&mut self, question: &str, default: Option<&str>) -> anyhow::Result<String> {
        loop {
            match default {
                Some(value) => write!(self.output, "{} [{}]: ", question, value)?,
                None => write!(self.output, "{}: ", question)?,
            }
            self.output.flush()?;
            let answer = self.read_line()?;
            match (answer.is_empty(), default) {
                (false, _) => return Ok(answer),
                (true, Some(value)) => return Ok(value.to_string()),
                (true, None) => writeln!(self.output, "an answer is required")?,
            }
        }
    }

    pub fn parsed<T>(&mut self, question: &str, default: Option<T>) -> anyhow::Result<T>
    where
        T: FromStr + Display,
        T::Err: Display,
    {
        let default_text = default.as_ref().map(ToString::to_string);
        loop {
            let answer = self.text(question, default_text.as_deref())?;
            match answer.parse::<T>() {
                Ok(value) => return Ok(value),
                Err(err) => writeln!(self.output, "'{}' is not valid: {}", answer, err)?,
            }
        }
    }

    pub fn yes_no(&mut self, question: &str, default: bool) -> anyhow::Result<bool> {
        let default_text = if default { "y" } else { "n" };
        loop {
            let answer = self.text(question, Some(default_text))?;
            match answer.to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "please answer y or n")?,
            }
        }
    }

    /// Offers a numbered list and returns the chosen entry.
    pub fn choice(
        &mut self,
        question: &str,
        options: &[&str],
        default: usize,
    ) -> anyhow::Result<String> {
        for (index, option) in options.iter().enumerate() {
            writeln!(self.output, "  {}) {}", index, option)?;
        }
        loop {
            let index: usize = self.parsed(question, Some(default))?;
            match options.get(index) {
                Some(option) => return Ok(option.to_string()),
                None => writeln!(self.output, "choose 0..{}", options.len() - 1)?,
            }
        }
    }

    pub fn message(&mut self, text: &str) -> anyhow::Result<()> {
        writeln!(self.output, "{}", text)?;
        Ok(())
    }
}

/// Walks through every field of a ToO request.
pub fn draft_request<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
) -> anyhow::Result<TooRequest> {
    let source_name = prompter.text("Source name", None)?;
    let source_type = prompter.text("Source type", Some(DEFAULT_SOURCE_TYPE))?;
    let ra: f64 = prompter.parsed("RA (J2000, degrees)", None)?;
    let dec: f64 = prompter.parsed("Dec (J2000, degrees)", None)?;
    let immediate_objective = prompter.text("Immediate objective", None)?;
    let exp_time_per_visit: f64 = prompter.parsed("Exposure time per visit (s)", None)?;
    let monitoring_freq = prompter.text("Monitoring frequency", Some(DEFAULT_MONITORING_FREQ))?;
    let num_of_visits: u32 = prompter.parsed("Number of visits", Some(DEFAULT_NUM_OF_VISITS))?;
    let obs_type = prompter.choice("Observation type", &OBS_TYPES, DEFAULT_OBS_TYPE)?;
    let opt_mag: f64 = prompter.parsed("Current optical magnitude", None)?;
    let opt_filt = prompter.text("Filter of that magnitude", Some(DEFAULT_OPT_FILT))?;

    prompter.message(urgency_rules())?;
    let urgency = loop {
        let urgency: u8 = prompter.parsed("Urgency", Some(DEFAULT_URGENCY))?;
        if (1..=4).contains(&urgency) {
            break urgency;
        }
        prompter.message("urgency must be 1 to 4")?;
    };

    let uvot_mode = loop {
        let text = prompter.text("UVOT mode", Some(format_uvot_mode(DEFAULT_UVOT_MODE).as_str()))?;
        match parse_uvot_mode(&text) {
            Ok(mode) => break format_uvot_mode(mode),
            Err(err) => prompter.message(&format!("{:#}", err))?,
        }
    };

    let science_just = justification(prompter, "science", DEFAULT_SCIENCE_JUST)?;
    let exp_time_just = justification(
        prompter,
        "exposure time",
        &default_exposure_just(exp_time_per_visit),
    )?;
    let uvot_just = justification(prompter, "UVOT mode", DEFAULT_UVOT_JUST)?;

    let request = TooRequest {
        source_name,
        source_type,
        ra,
        dec,
        immediate_objective,
        exp_time_per_visit,
        monitoring_freq,
        num_of_visits,
        obs_type,
        opt_mag,
        opt_filt,
        urgency,
        instrument: "UVOT".into(),
        uvot_mode,
        science_just,
        exp_time_just,
        uvot_just,
    };
    request.validate()?;
    Ok(request)
}

fn justification<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    topic: &str,
    default: &str,
) -> anyhow::Result<String> {
    prompter.message(&format!("Default {} justification:\n{}", topic, default))?;
    if prompter.yes_no(&format!("Use the default {} justification?", topic), true)? {
        Ok(default.to_string())
    } else {
        prompter.text(&format!("{} justification", topic), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(answers: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(answers.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn empty_answer_takes_default() {
        let mut p = prompter("\n");
        assert_eq!(p.text("Source type", Some("Supernova")).unwrap(), "Supernova");
    }

    #[test]
    fn invalid_numbers_are_asked_again() {
        let mut p = prompter("abc\n12.5\n");
        let value: f64 = p.parsed("RA", None).unwrap();
        assert_eq!(value, 12.5);
        let shown = String::from_utf8(p.output.clone()).unwrap();
        assert!(shown.contains("'abc' is not valid"));
    }

    #[test]
    fn closed_input_is_an_error() {
        let mut p = prompter("");
        assert!(p.text("Source name", None).is_err());
    }

    #[test]
    fn choice_returns_the_named_option() {
        let mut p = prompter("7\n3\n");
        assert_eq!(p.choice("Observation type", &OBS_TYPES, 1).unwrap(), "Timing");
    }

    #[test]
    fn draft_with_defaults() {
        let answers = [
            "SN 2023ixf",
            "",
            "210.910674",
            "54.311663",
            "Early UV evolution",
            "1500",
            "",
            "",
            "",
            "11.2",
            "",
            "9",
            "1",
            "",
            "",
            "n",
            "Bright target, short exposures suffice.",
            "",
        ]
        .join("\n")
            + "\n";
        let mut p = prompter(&answers);
        let request = draft_request(&mut p).unwrap();

        assert_eq!(request.source_type, "Supernova");
        assert_eq!(request.num_of_visits, 7);
        assert_eq!(request.obs_type, "Light Curve");
        assert_eq!(request.urgency, 1);
        assert_eq!(request.uvot_mode, "0x223f");
        assert_eq!(request.science_just, DEFAULT_SCIENCE_JUST);
        assert_eq!(request.exp_time_just, "Bright target, short exposures suffice.");
        assert_eq!(request.uvot_just, DEFAULT_UVOT_JUST);
    }
}
