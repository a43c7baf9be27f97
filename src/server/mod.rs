//! HTTP server: homepage, contact intake and blog

mod form;

use anyhow::Result;
use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::MailCredentials;
use crate::contact::{DisabledNotifier, Notifier, SmtpNotifier, Submission, SubmissionLog};
use crate::content::{load_testimonials, loader::PostLoader, Testimonial};
use crate::error::AppError;
use crate::templates::TemplateRenderer;
use crate::Folio;

/// Everything handlers need, built once at startup and never mutated
pub struct AppState {
    pub folio: Folio,
    pub posts: PostLoader,
    pub templates: TemplateRenderer,
    pub testimonials: Vec<Testimonial>,
    pub submissions: SubmissionLog,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Load testimonials and templates for `folio`
    pub fn new(folio: Folio, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let testimonials = load_testimonials(&folio.testimonials_path)?;
        let templates = TemplateRenderer::new(&folio.config)?;
        let posts = folio.post_loader();
        posts.report_duplicates();

        Ok(Self {
            posts,
            submissions: SubmissionLog::new(&folio.submissions_path),
            templates,
            testimonials,
            notifier,
            folio,
        })
    }

    /// Like `new`, with an SMTP notifier when mail credentials are set in the environment
    pub fn from_env(folio: Folio) -> Result<Self> {
        let notifier: Arc<dyn Notifier> = match MailCredentials::from_env() {
            Some(credentials) => {
                tracing::info!(
                    "Contact notifications go through {}:{}",
                    folio.config.mail.host,
                    folio.config.mail.port
                );
                Arc::new(SmtpNotifier::new(&folio.config.mail, credentials)?)
            }
            None => {
                tracing::warn!("EMAIL_USER/EMAIL_PASS not set, contact notifications disabled");
                Arc::new(DisabledNotifier)
            }
        };
        Self::new(folio, notifier)
    }

    /// Rendered 404 page
    fn not_found(&self) -> Response {
        match self.templates.not_found() {
            Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
            Err(e) => {
                tracing::error!("Failed to render 404 page: {}", e);
                (StatusCode::NOT_FOUND, "Not found").into_response()
            }
        }
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.folio.static_dir);

    Router::new()
        .route("/", get(home))
        .route("/contact", post(contact))
        .route("/thank-you", get(thank_you))
        .route("/blog", get(blog_list))
        .route("/blog/:slug", get(blog_post))
        .nest_service("/static", static_files)
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(folio: &Folio, ip: &str, port: u16) -> Result<()> {
    let state = Arc::new(AppState::from_env(folio.clone())?);
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn home(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    Ok(Html(state.templates.home(&state.testimonials)?))
}

/// Log the submission, fire the notification, then redirect
async fn contact(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Response, AppError> {
    let form = match form::read_contact_form(request).await {
        Ok(form) => form,
        Err(e) => {
            tracing::warn!("Rejected contact submission: {}", e);
            return Ok(e.into_response());
        }
    };
    let submission = Submission::from(form);

    let worker = Arc::clone(&state);
    let row = submission.clone();
    blocking(move || Ok(worker.submissions.append(&row)?)).await?;
    tracing::info!(
        "Contact submission received ({})",
        submission.email.as_deref().unwrap_or("no email")
    );

    state.notifier.dispatch(&submission);

    Ok(Redirect::to("/thank-you").into_response())
}

async fn thank_you(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    Ok(Html(state.templates.thank_you()?))
}

async fn blog_list(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let html = blocking(move || {
        let posts = state.posts.load_all()?;
        Ok(state.templates.blog_list(&posts)?)
    })
    .await?;
    Ok(Html(html))
}

async fn blog_post(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let worker = Arc::clone(&state);
    let html = blocking(move || match worker.posts.find(&slug)? {
        Some(post) => Ok(Some(worker.templates.blog_post(&post)?)),
        None => {
            tracing::debug!("No post with slug {:?}", slug);
            Ok(None)
        }
    })
    .await?;

    match html {
        Some(html) => Ok(Html(html).into_response()),
        None => Ok(state.not_found()),
    }
}

async fn fallback_handler(State(state): State<Arc<AppState>>) -> Response {
    state.not_found()
}

/// Run file reads, highlighting and log appends off the async workers
async fn blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}
