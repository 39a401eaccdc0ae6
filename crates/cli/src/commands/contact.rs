//! Contact form command.

use secrecy::ExposeSecret;
use tracing::info;

use despensa_storefront::AppError;
use despensa_storefront::config::StorefrontConfig;
use despensa_storefront::forms::ContactForm;

const MAPS_EMBED_URL: &str = "https://www.google.com/maps/embed/v1/place";
const WAREHOUSE_QUERY: &str = "Mercamadrid,Madrid";

/// Validate and accept a contact message.
///
/// # Errors
///
/// Returns every failed field of the form.
pub fn send(config: &StorefrontConfig, form: &ContactForm) -> Result<String, AppError> {
    form.validate()?;
    info!(subject = %form.subject, "contact message accepted");

    let mut lines = vec![format!(
        "Thanks, {}. We will reply to {} shortly.",
        form.name.trim(),
        form.email.trim()
    )];
    if let Some(key) = &config.maps_api_key {
        lines.push(format!(
            "Find us: {MAPS_EMBED_URL}?key={}&q={WAREHOUSE_QUERY}",
            key.expose_secret()
        ));
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn valid_form() -> ContactForm {
        ContactForm {
            name: "Lucía".to_string(),
            email: "lucia@elpuerto.es".to_string(),
            phone: None,
            subject: "Pedido semanal".to_string(),
            message: "Necesito precios para 20 kg de merluza.".to_string(),
            accept_privacy: true,
        }
    }

    #[test]
    fn test_reports_every_field() {
        let form = ContactForm {
            name: "L".to_string(),
            email: "lucia".to_string(),
            subject: String::new(),
            message: "Hola".to_string(),
            ..ContactForm::default()
        };
        let err = send(&StorefrontConfig::default(), &form).unwrap_err();
        let AppError::Validation(errors) = err else {
            panic!("expected field errors");
        };
        for field in ["name", "email", "subject", "message", "accept_privacy"] {
            assert!(errors.get(field).is_some(), "{field} not reported");
        }
    }

    #[test]
    fn test_valid_message() {
        let output = send(&StorefrontConfig::default(), &valid_form()).unwrap();
        assert!(output.contains("lucia@elpuerto.es"));
        assert!(!output.contains("Find us"));
    }

    #[test]
    fn test_map_link_with_key() {
        let config = StorefrontConfig {
            maps_api_key: Some(SecretString::from("maps-key")),
            ..StorefrontConfig::default()
        };
        let output = send(&config, &valid_form()).unwrap();
        assert!(output.contains("key=maps-key&q=Mercamadrid"));
    }
}
