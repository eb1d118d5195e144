use std::{path::PathBuf, time::Duration};

use log::{info, warn};

use crate::{
    AuthError, PageContext, PortalEndpoints,
    cookie_jar::{load_cookie_jar, save_cookie_jar},
    requests::RequestClient,
};

/// Who is logging in. Only lives for the duration of a run.
pub struct Credentials {
    pub identifier: String,
    pub secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFlow {
    /// The portal doesn't know this device yet: id, then password + one-time code.
    TwoFactor,
    /// The device is remembered; the password alone is enough.
    PasswordOnly,
}

impl LoginFlow {
    /// A remembered device gets a landing page that already shows the user's id.
    pub fn detect(page_body: &str, identifier: &str) -> Self {
        if page_body.contains(identifier) {
            LoginFlow::PasswordOnly
        } else {
            LoginFlow::TwoFactor
        }
    }
}

/// Supplies the one-time code sent out of band during a two-factor login.
pub trait AuthCodeSource {
    fn auth_code(&mut self) -> Result<String, AuthError>;
}

pub struct AuthenticatedSession {
    pub client: RequestClient,
    pub endpoints: PortalEndpoints,
    pub flow: LoginFlow,
    pub page: PageContext,
}

pub struct SessionAuthenticator {
    endpoints: PortalEndpoints,
    cookie_path: PathBuf,
    politeness_delay: Duration,
}

impl SessionAuthenticator {
    pub fn new(
        endpoints: PortalEndpoints,
        cookie_path: PathBuf,
        politeness_delay: Duration,
    ) -> Self {
        Self {
            endpoints,
            cookie_path,
            politeness_delay,
        }
    }

    pub async fn login(
        self,
        credentials: &Credentials,
        auth_codes: &mut dyn AuthCodeSource,
    ) -> anyhow::Result<AuthenticatedSession> {
        let cookie_jar = load_cookie_jar(&self.cookie_path)?;
        let client = RequestClient::new(cookie_jar, self.politeness_delay)?;

        let landing = PageContext::parse(client.get_page(&self.endpoints.initial_url).await?)?;
        let flow = LoginFlow::detect(&landing.body, &credentials.identifier);
        let page = match flow {
            LoginFlow::TwoFactor => {
                info!("Log in with the two-step verification.");
                self.two_factor_login(&client, landing, credentials, auth_codes)
                    .await?
            }
            LoginFlow::PasswordOnly => {
                info!("Log in using the password.");
                self.password_login(&client, landing, credentials).await?
            }
        };

        save_cookie_jar(client.cookie_jar(), &self.cookie_path)?;
        info!("Saved cookies to {}", self.cookie_path.display());

        Ok(AuthenticatedSession {
            client,
            endpoints: self.endpoints,
            flow,
            page,
        })
    }

    async fn two_factor_login(
        &self,
        client: &RequestClient,
        page: PageContext,
        credentials: &Credentials,
        auth_codes: &mut dyn AuthCodeSource,
    ) -> anyhow::Result<PageContext> {
        let form = identify_form(&page, &credentials.identifier);
        let page = PageContext::parse(client.post_form(&self.endpoints.auth_url, &form).await?)?;

        let code = auth_codes.auth_code()?;
        let form = verify_form(&page, &credentials.secret, &code);
        PageContext::parse(client.post_form(&self.endpoints.auth_url, &form).await?)
    }

    async fn password_login(
        &self,
        client: &RequestClient,
        page: PageContext,
        credentials: &Credentials,
    ) -> anyhow::Result<PageContext> {
        let form = password_form(&page, &credentials.secret);
        PageContext::parse(client.post_form(&self.endpoints.auth_url, &form).await?)
    }
}

type Form = Vec<(&'static str, String)>;

/// The step and anti-replay tokens every auth POST starts with.
fn token_fields(page: &PageContext) -> Form {
    let mut form = Form::new();
    for (name, value) in [("funcid", &page.funcid), ("arcv", &page.arcv)] {
        match value {
            Some(value) => form.push((name, value.clone())),
            None => warn!("previous page had no {name} field, sending the form without it"),
        }
    }
    form
}

fn identify_form(page: &PageContext, identifier: &str) -> Form {
    let mut form = token_fields(page);
    form.push(("authid", identifier.to_string()));
    form.push(("idomitflag", "1".to_string()));
    form
}

fn verify_form(page: &PageContext, secret: &str, code: &str) -> Form {
    let mut form = token_fields(page);
    form.push(("authpass", secret.to_string()));
    form.push(("rotpwd", code.to_string()));
    form.push(("devicename", "bs".to_string()));
    form.push(("deviceflag", "1".to_string()));
    form
}

fn password_form(page: &PageContext, secret: &str) -> Form {
    let mut form = token_fields(page);
    form.push(("authpass", secret.to_string()));
    form.push(("rotpwd", String::new()));
    form.push(("devicename", String::new()));
    form
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn page(funcid: Option<&str>, arcv: Option<&str>) -> PageContext {
        let mut html = String::from("<form>");
        if let Some(funcid) = funcid {
            html += &format!(r#"<input type="hidden" name="funcid" value="{funcid}">"#);
        }
        if let Some(arcv) = arcv {
            html += &format!(r#"<input type="hidden" name="arcv" value="{arcv}">"#);
        }
        html += "</form>";
        PageContext::parse(html).unwrap()
    }

    fn names(form: &Form) -> Vec<&str> {
        form.iter().map(|(name, _)| *name).collect()
    }

    #[test_case("<p>ようこそ dcard_user 様</p>", LoginFlow::PasswordOnly; "id shown on landing page")]
    #[test_case("<p>ログインしてください</p>", LoginFlow::TwoFactor; "id absent")]
    #[test_case("", LoginFlow::TwoFactor; "empty page")]
    fn flow_follows_whether_the_id_is_on_the_page(body: &str, expected: LoginFlow) {
        assert_eq!(LoginFlow::detect(body, "dcard_user"), expected);
    }

    #[test]
    fn identify_form_echoes_tokens_then_id() {
        let form = identify_form(&page(Some("F1"), Some("A1")), "dcard_user");
        assert_eq!(
            form,
            vec![
                ("funcid", "F1".to_string()),
                ("arcv", "A1".to_string()),
                ("authid", "dcard_user".to_string()),
                ("idomitflag", "1".to_string()),
            ]
        );
    }

    #[test]
    fn verify_form_registers_the_device() {
        let form = verify_form(&page(Some("F2"), Some("A2")), "hunter2", "987654");
        assert_eq!(
            form,
            vec![
                ("funcid", "F2".to_string()),
                ("arcv", "A2".to_string()),
                ("authpass", "hunter2".to_string()),
                ("rotpwd", "987654".to_string()),
                ("devicename", "bs".to_string()),
                ("deviceflag", "1".to_string()),
            ]
        );
    }

    #[test]
    fn password_form_sends_blank_code_and_device() {
        let form = password_form(&page(Some("F3"), Some("A3")), "hunter2");
        assert_eq!(
            names(&form),
            vec!["funcid", "arcv", "authpass", "rotpwd", "devicename"]
        );
        assert_eq!(form[3].1, "");
        assert_eq!(form[4].1, "");
    }

    #[test]
    fn missing_tokens_are_left_out_of_the_form() {
        let form = password_form(&page(None, Some("A4")), "hunter2");
        assert_eq!(names(&form), vec!["arcv", "authpass", "rotpwd", "devicename"]);

        let form = identify_form(&page(None, None), "dcard_user");
        assert_eq!(names(&form), vec!["authid", "idomitflag"]);
    }

    #[test]
    fn debug_output_hides_the_secret() {
        let credentials = Credentials {
            identifier: "dcard_user".to_string(),
            secret: "hunter2".to_string(),
        };
        let printed = format!("{credentials:?}");
        assert!(printed.contains("dcard_user"));
        assert!(!printed.contains("hunter2"));
    }
}
