//! Terminal rendition of the survey form.

use dialoguer::{theme::ColorfulTheme, Input};
use employee_survey::config::FormConfig;
use employee_survey::domain::models::Field;
use employee_survey::form::{validate_field, SurveyClient, SurveyForm};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = FormConfig::from_env();
    let theme = ColorfulTheme::default();
    let mut form = SurveyForm::new();

    println!("Employee Satisfaction Survey");
    for field in Field::ALL {
        let value: String = Input::with_theme(&theme)
            .with_prompt(field.label())
            .allow_empty(field == Field::Feedback)
            .validate_with(move |input: &String| validate_field(field, input))
            .interact_text()?;
        form.set(field, value);
    }

    let client = SurveyClient::new(config.endpoint);
    match form.submit(&client).await {
        Ok(outcome) => {
            println!("{}", outcome.user_message());
            if !outcome.is_accepted() {
                std::process::exit(1);
            }
        }
        Err(errors) => {
            if let Some(message) = errors.form() {
                eprintln!("{}", message);
            }
            for (field, message) in errors.iter() {
                eprintln!("{}: {}", field.label(), message);
            }
            std::process::exit(1);
        }
    }
    Ok(())
}
