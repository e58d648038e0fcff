use crate::error::{DamError, Result};
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};

/// A composed outbound notification, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub from: String,
    pub to: String,
    pub cc: Vec<String>,
    pub subject: String,
    pub html_body: String,
}

/// Outbound mail collaborator. Delivery is synchronous from the engine's
/// point of view: `send` returns once the transport has accepted or
/// rejected the message.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<()>;
}

/// SMTP mailer over a plain relay, matching the original deployment's
/// in-network mail host (no TLS on the hop to the relay).
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(
        host: &str,
        port: u16,
        username: &str,
        password: Option<&str>,
    ) -> Self {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                .port(port);
        if let Some(password) = password {
            builder = builder.credentials(Credentials::new(
                username.to_string(),
                password.to_string(),
            ));
        }
        Self { transport: builder.build() }
    }

    fn mailbox(address: &str) -> Result<Mailbox> {
        address
            .parse()
            .map_err(|e| DamError::Send(format!("bad address {address}: {e}")))
    }
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer").finish_non_exhaustive()
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: &OutboundMessage) -> Result<()> {
        let mut builder = Message::builder()
            .from(Self::mailbox(&message.from)?)
            .to(Self::mailbox(&message.to)?)
            .subject(message.subject.clone());
        for cc in &message.cc {
            builder = builder.cc(Self::mailbox(cc)?);
        }
        let email = builder
            .header(ContentType::TEXT_HTML)
            .body(message.html_body.clone())
            .map_err(|e| DamError::Send(format!("compose failed: {e}")))?;

        self.transport
            .send(email)
            .await
            .map(|_| ())
            .map_err(|e| DamError::Send(e.to_string()))
    }
}
