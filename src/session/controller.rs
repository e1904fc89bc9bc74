//! Session controller
//!
//! [`AnalystDesk`] is the entry point for one application: it owns the live
//! sessions of its users, runs the event handlers and performs the effects
//! they request (asking the analyst service, writing the audit trail).
//! Best-effort failures such as an audit or bookmark write are reported as
//! [`Notice`]s instead of errors.

use super::events::{self, AnswerReceived, Effect};
use super::registry::SessionRegistry;
use super::{ConversationSession, SessionKey};
use crate::analyst::{Analyst, AnalystReply, Message, SemanticModelRef};
use crate::config::Config;
use crate::error::{AnalystDeskError, Result};
use crate::quick_questions::QuickQuestions;
use crate::storage::{AppConfig, AuditSink, SqliteStorage};
use crate::warehouse::{ResultSet, StatementContext, StatementRunner};

use chrono::Utc;
use std::fmt;
use std::sync::Arc;

/// Non-fatal event surfaced next to a result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The exchange succeeded but could not be written to the audit log
    AuditWriteFailed(String),
    /// The service attached a warning to its answer
    ServiceWarning(String),
    /// A bookmark was saved
    BookmarkSaved(String),
    /// A bookmark could not be saved
    BookmarkFailed(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AuditWriteFailed(reason) => write!(f, "Answer not logged: {}", reason),
            Self::ServiceWarning(message) => write!(f, "Warning: {}", message),
            Self::BookmarkSaved(question) => write!(f, "Bookmarked: {}", question),
            Self::BookmarkFailed(reason) => write!(f, "Bookmark not saved: {}", reason),
        }
    }
}

/// Answer to one question
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Assistant turn appended to the history
    pub reply: Message,
    /// Request latency in milliseconds
    pub elapsed_ms: u64,
    /// Non-fatal events raised while answering
    pub notices: Vec<Notice>,
}

/// Conversations of all users of one application
pub struct AnalystDesk {
    app: AppConfig,
    analyst: Arc<dyn Analyst>,
    audit: Arc<dyn AuditSink>,
    runner: Option<Arc<dyn StatementRunner>>,
    storage: SqliteStorage,
    quick: QuickQuestions,
    registry: SessionRegistry,
    language: String,
    quick_limit: usize,
}

impl AnalystDesk {
    /// Create a controller for `app`
    ///
    /// `storage` serves bookmarks and quick questions and, unless replaced
    /// with [`AnalystDesk::with_audit_sink`], the audit trail.
    pub fn new(
        app: AppConfig,
        analyst: Arc<dyn Analyst>,
        storage: SqliteStorage,
        config: &Config,
    ) -> Self {
        tracing::info!(
            "Opening {} (app {}) with {} semantic model(s)",
            app.name,
            app.app_id,
            app.models.len()
        );
        Self {
            quick: QuickQuestions::from_config(storage.clone(), &config.quick_questions),
            audit: Arc::new(storage.clone()),
            runner: None,
            app,
            analyst,
            storage,
            registry: SessionRegistry::new(),
            language: config.user.language.clone(),
            quick_limit: config.quick_questions.limit,
        }
    }

    /// Replace the audit destination
    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Enable execution of the SQL returned in answers
    pub fn with_statement_runner(mut self, runner: Arc<dyn StatementRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    /// Application served by this controller
    pub fn app(&self) -> &AppConfig {
        &self.app
    }

    /// Logical names of the active semantic models
    pub fn models(&self) -> Vec<&str> {
        self.app.models.iter().map(|m| m.name.as_str()).collect()
    }

    fn key(&self, username: &str) -> SessionKey {
        SessionKey::new(self.app.app_id, username)
    }

    fn current(&mut self, key: &SessionKey) -> ConversationSession {
        self.registry
            .get_or_create(key, self.app.default_model())
            .clone()
    }

    /// Session of `username`, started on first use
    pub fn session(&mut self, username: &str) -> &ConversationSession {
        let key = self.key(username);
        self.registry.get_or_create(&key, self.app.default_model())
    }

    /// End the session of `username`
    pub fn end_session(&mut self, username: &str) {
        let key = self.key(username);
        if self.registry.reset(&key).is_some() {
            tracing::debug!("Ended session {}", key);
        }
    }

    /// Switch the semantic model; a different model starts a new conversation
    pub fn select_model(&mut self, username: &str, model: &str) -> Result<()> {
        if !self.app.has_model(model) {
            return Err(AnalystDeskError::Validation(format!(
                "Unknown semantic model {} (available: {})",
                model,
                self.models().join(", ")
            ))
            .into());
        }

        let key = self.key(username);
        let session = self.current(&key);
        let transition = events::on_model_selected(&session, model);
        tracing::info!("{} selected model {}", key, model);
        self.registry.put(transition.session);
        Ok(())
    }

    /// Ask a question and wait for the answer
    ///
    /// On success the exchange is appended to the history and recorded in
    /// the audit log before the reply is returned. On failure the question
    /// stays in the history, the session is ready for the next question,
    /// and the classified [`AnalystDeskError`] is returned.
    pub async fn submit_question(&mut self, username: &str, text: &str) -> Result<TurnOutcome> {
        let key = self.key(username);
        let session = self.current(&key);

        let app = &self.app;
        let transition = events::on_question_submitted(&session, text, |name| {
            app.model_file(name).map(str::to_string)
        })?;
        let waiting = transition.session;
        self.registry.put(waiting.clone());

        let mut exchange = None;
        for effect in transition.effects {
            if let Effect::AskAnalyst {
                question,
                model_file,
            } = effect
            {
                let model = self.model_ref(&model_file);
                tracing::debug!("{} asking {} against {}", key, question, model);
                let result = self.analyst.ask(&question, &model).await;
                exchange = Some((question, model_file, result));
            }
        }

        let Some((question, model_file, result)) = exchange else {
            self.registry.put(events::on_answer_failed(&waiting).session);
            return Err(AnalystDeskError::Validation("No question to send".into()).into());
        };

        let elapsed_ms = result.elapsed_ms;
        match result.outcome {
            Ok(reply) => {
                let outcome = self.complete(&waiting, &question, &model_file, &reply, elapsed_ms);
                Ok(outcome)
            }
            Err(err) => {
                tracing::error!("{} question failed after {} ms: {}", key, elapsed_ms, err);
                self.registry.put(events::on_answer_failed(&waiting).session);
                Err(err.into())
            }
        }
    }

    fn complete(
        &mut self,
        waiting: &ConversationSession,
        question: &str,
        model_file: &str,
        reply: &AnalystReply,
        elapsed_ms: u64,
    ) -> TurnOutcome {
        let transition = events::on_answer_received(
            waiting,
            AnswerReceived {
                question,
                app_name: &self.app.name,
                model_file,
                reply,
                elapsed_ms,
                completed_at: Utc::now(),
            },
        );

        let mut notices: Vec<Notice> = reply
            .warnings
            .iter()
            .map(|w| Notice::ServiceWarning(w.clone()))
            .collect();

        for effect in &transition.effects {
            if let Effect::RecordExchange(entry) = effect {
                if let Err(e) = self.audit.record(entry) {
                    tracing::warn!("Failed to record exchange for {}: {:#}", waiting.key(), e);
                    notices.push(Notice::AuditWriteFailed(format!("{:#}", e)));
                }
            }
        }

        tracing::info!(
            "{} answered in {} ms ({} block(s))",
            waiting.key(),
            elapsed_ms,
            reply.content.len()
        );

        self.registry.put(transition.session);
        TurnOutcome {
            reply: Message::assistant(reply.content.clone()),
            elapsed_ms,
            notices,
        }
    }

    /// Submit one of the suggestions offered by an earlier answer
    pub async fn select_suggestion(&mut self, username: &str, text: &str) -> Result<TurnOutcome> {
        let key = self.key(username);
        let session = self.current(&key);

        let clicked = events::on_suggestion_clicked(&session, text)?;
        let (taken, pending) = events::take_pending_suggestion(&clicked.session);
        self.registry.put(taken.session);

        match pending {
            Some(question) => self.submit_question(username, &question).await,
            None => Err(AnalystDeskError::Validation("No suggestion selected".into()).into()),
        }
    }

    /// Run SQL statement number `n` (1-based) of the latest answer
    ///
    /// The statement is resolved against the application's database and
    /// schema. Nothing is added to the history or the audit log.
    pub async fn run_statement(&mut self, username: &str, n: usize) -> Result<ResultSet> {
        let runner = self
            .runner
            .clone()
            .ok_or_else(|| AnalystDeskError::Validation("SQL execution is not configured".into()))?;

        let key = self.key(username);
        let statement = self
            .session(username)
            .statement(n)
            .map(str::to_string)
            .ok_or_else(|| {
                AnalystDeskError::Validation(format!(
                    "No SQL statement number {} in the latest answer",
                    n
                ))
            })?;

        tracing::info!("{} running statement {} of the latest answer", key, n);
        runner
            .run(&statement, &StatementContext::from(&self.app))
            .await
    }

    /// Save `question` as a bookmark shared with every user of the application
    pub fn bookmark(&self, username: &str, question: &str) -> Notice {
        let question = question.trim();
        if question.is_empty() {
            return Notice::BookmarkFailed("question must not be empty".into());
        }

        match self
            .storage
            .save_bookmark(self.app.app_id, username, question, &self.language)
        {
            Ok(entry) => Notice::BookmarkSaved(entry.question),
            Err(e) => {
                tracing::warn!("Failed to save bookmark for {}: {:#}", username, e);
                Notice::BookmarkFailed(format!("{:#}", e))
            }
        }
    }

    /// Shortcut questions offered before the conversation starts
    pub fn quick_questions(&mut self, username: &str) -> Result<Vec<String>> {
        let key = self.key(username);
        self.quick.recent_questions(&key, self.quick_limit)
    }

    fn model_ref(&self, model_file: &str) -> SemanticModelRef {
        SemanticModelRef {
            database: self.app.database.clone(),
            schema: self.app.schema.clone(),
            stage: self.app.stage.clone(),
            file: model_file.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyst::{AnalystExchange, ContentBlock, Role};
    use crate::session::Phase;
    use crate::storage::test_support::create_test_storage;
    use crate::storage::{LogEntry, SemanticModel};
    use crate::warehouse::Column;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Analyst replaying canned outcomes and remembering what it was asked
    struct ScriptedAnalyst {
        outcomes: Mutex<Vec<std::result::Result<Vec<ContentBlock>, AnalystDeskError>>>,
        asked: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedAnalyst {
        fn new(outcomes: Vec<std::result::Result<Vec<ContentBlock>, AnalystDeskError>>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: Mutex::new(outcomes.into_iter().rev().collect()),
                asked: Mutex::new(Vec::new()),
            })
        }

        fn asked(&self) -> Vec<(String, String)> {
            self.asked.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Analyst for ScriptedAnalyst {
        async fn ask(&self, question: &str, model: &SemanticModelRef) -> AnalystExchange {
            self.asked
                .lock()
                .unwrap()
                .push((question.to_string(), model.to_string()));
            let outcome = self
                .outcomes
                .lock()
                .unwrap()
                .pop()
                .expect("no scripted outcome left")
                .map(|content| AnalystReply {
                    raw: serde_json::json!({ "message": { "content": content } }),
                    content,
                    request_id: None,
                    warnings: Vec::new(),
                });
            AnalystExchange {
                elapsed_ms: 7,
                outcome,
            }
        }
    }

    struct FailingAudit;

    impl AuditSink for FailingAudit {
        fn record(&self, _entry: &LogEntry) -> Result<()> {
            Err(AnalystDeskError::Persistence("disk full".into()).into())
        }
    }

    fn winter_games() -> AppConfig {
        AppConfig {
            app_id: 3,
            name: "Winter Games".into(),
            database: "CORTEX_ANALYST_DEMO".into(),
            schema: "WINTER_GAME".into(),
            stage: "RAW_DATA".into(),
            logo: None,
            models: vec![
                SemanticModel {
                    name: "WinterGameModel".into(),
                    file: "winter_game.yaml".into(),
                },
                SemanticModel {
                    name: "AthletesModel".into(),
                    file: "athletes.yaml".into(),
                },
            ],
        }
    }

    fn desk(analyst: Arc<ScriptedAnalyst>) -> (AnalystDesk, SqliteStorage, tempfile::TempDir) {
        let (storage, dir) = create_test_storage();
        let desk = AnalystDesk::new(winter_games(), analyst, storage.clone(), &Config::default());
        (desk, storage, dir)
    }

    fn kind(err: &anyhow::Error) -> Option<&AnalystDeskError> {
        err.downcast_ref::<AnalystDeskError>()
    }

    #[tokio::test]
    async fn test_france_medals_exchange() {
        let analyst = ScriptedAnalyst::new(vec![Ok(vec![ContentBlock::text("France won 15 medals.")])]);
        let (mut desk, storage, _dir) = desk(analyst.clone());

        let outcome = desk
            .submit_question("alice", "How many medals did France win?")
            .await
            .unwrap();
        assert_eq!(outcome.reply.text(), "France won 15 medals.");
        assert!(outcome.notices.is_empty());

        let session = desk.session("alice");
        assert_eq!(session.phase(), Phase::Idle);
        let roles: Vec<Role> = session.history().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);

        assert_eq!(
            analyst.asked(),
            vec![(
                "How many medals did France win?".to_string(),
                "@CORTEX_ANALYST_DEMO.WINTER_GAME.RAW_DATA/winter_game.yaml".to_string()
            )]
        );

        let rows = storage.log_entries(3).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].username, "alice");
        assert_eq!(rows[0].app_name, "Winter Games");
        assert_eq!(rows[0].model_file, "winter_game.yaml");
        assert_eq!(rows[0].input_text, "How many medals did France win?");
        assert_eq!(rows[0].elapsed_ms, 7);
        assert!(rows[0].output_json.contains("France won 15 medals."));
    }

    #[tokio::test]
    async fn test_service_error_keeps_question_only() {
        let analyst = ScriptedAnalyst::new(vec![Err(AnalystDeskError::Service {
            status: 500,
            detail: "internal".into(),
        })]);
        let (mut desk, storage, _dir) = desk(analyst);

        let err = desk.submit_question("alice", "q").await.unwrap_err();
        assert!(matches!(kind(&err), Some(AnalystDeskError::Service { status: 500, .. })));

        let session = desk.session("alice");
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].role, Role::User);
        assert_eq!(storage.log_count(3).unwrap(), 0);
    }

    async fn assert_failed_turn(failure: AnalystDeskError) -> AnalystDeskError {
        let analyst = ScriptedAnalyst::new(vec![Ok(vec![ContentBlock::text("a")]), Err(failure)]);
        let (mut desk, storage, _dir) = desk(analyst);

        desk.submit_question("alice", "first").await.unwrap();
        let before = desk.session("alice").history().len();

        let err = desk.submit_question("alice", "second").await.unwrap_err();

        let session = desk.session("alice");
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.history().len(), before + 1);
        assert_eq!(session.last_question().as_deref(), Some("second"));
        assert_eq!(storage.log_count(3).unwrap(), 1);
        err.downcast::<AnalystDeskError>().unwrap()
    }

    #[tokio::test]
    async fn test_malformed_response_keeps_question_only() {
        let err = assert_failed_turn(AnalystDeskError::MalformedResponse(
            "missing field `content`".into(),
        ))
        .await;
        assert!(matches!(err, AnalystDeskError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_transport_error_keeps_question_only() {
        let err = assert_failed_turn(AnalystDeskError::Transport {
            cause: "request timed out after 30000 ms".into(),
        })
        .await;
        assert!(matches!(err, AnalystDeskError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_question_is_logged_as_submitted() {
        let analyst = ScriptedAnalyst::new(vec![Ok(vec![ContentBlock::text("ok")])]);
        let (mut desk, storage, _dir) = desk(analyst.clone());

        desk.submit_question("alice", "  padded question  ").await.unwrap();

        assert_eq!(analyst.asked()[0].0, "  padded question  ");
        assert_eq!(
            desk.session("alice").last_question().as_deref(),
            Some("  padded question  ")
        );
        assert_eq!(storage.log_entries(3).unwrap()[0].input_text, "  padded question  ");
    }

    #[tokio::test]
    async fn test_blank_question_never_reaches_analyst() {
        let analyst = ScriptedAnalyst::new(Vec::new());
        let (mut desk, _storage, _dir) = desk(analyst.clone());

        let err = desk.submit_question("alice", "  ").await.unwrap_err();
        assert!(matches!(kind(&err), Some(AnalystDeskError::Validation(_))));
        assert!(analyst.asked().is_empty());
        assert!(desk.session("alice").history().is_empty());
    }

    #[tokio::test]
    async fn test_app_without_models_rejects_questions() {
        let analyst = ScriptedAnalyst::new(Vec::new());
        let (storage, _dir) = create_test_storage();
        let mut app = winter_games();
        app.models.clear();
        let mut desk = AnalystDesk::new(app, analyst.clone(), storage, &Config::default());

        let err = desk.submit_question("alice", "q").await.unwrap_err();
        assert!(matches!(kind(&err), Some(AnalystDeskError::Validation(_))));
        assert!(analyst.asked().is_empty());
    }

    #[tokio::test]
    async fn test_model_change_empties_history() {
        let analyst = ScriptedAnalyst::new(vec![Ok(vec![ContentBlock::text("a")])]);
        let (mut desk, _storage, _dir) = desk(analyst);

        desk.submit_question("alice", "q").await.unwrap();
        desk.select_model("alice", "AthletesModel").unwrap();

        let session = desk.session("alice");
        assert_eq!(session.selected_model(), Some("AthletesModel"));
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_unknown_model_is_rejected() {
        let (mut desk, _storage, _dir) = desk(ScriptedAnalyst::new(Vec::new()));
        let err = desk.select_model("alice", "Ghost").unwrap_err();
        assert!(matches!(kind(&err), Some(AnalystDeskError::Validation(_))));
        assert_eq!(desk.session("alice").selected_model(), Some("WinterGameModel"));
    }

    #[tokio::test]
    async fn test_audit_failure_still_returns_answer() {
        let analyst = ScriptedAnalyst::new(vec![Ok(vec![ContentBlock::text("ok")])]);
        let (desk, _storage, _dir) = desk(analyst);
        let mut desk = desk.with_audit_sink(Arc::new(FailingAudit));

        let outcome = desk.submit_question("alice", "q").await.unwrap();
        assert_eq!(outcome.reply.text(), "ok");
        assert!(matches!(
            outcome.notices.as_slice(),
            [Notice::AuditWriteFailed(reason)] if reason.contains("disk full")
        ));
        assert_eq!(desk.session("alice").history().len(), 2);
    }

    #[tokio::test]
    async fn test_suggestion_is_submitted_once() {
        let analyst = ScriptedAnalyst::new(vec![
            Ok(vec![
                ContentBlock::text("Which games?"),
                ContentBlock::Suggestions {
                    suggestions: vec!["Medals in 2022?".into(), "Medals in 2018?".into()],
                },
            ]),
            Ok(vec![ContentBlock::text("12 medals.")]),
        ]);
        let (mut desk, _storage, _dir) = desk(analyst.clone());

        desk.submit_question("alice", "How many medals?").await.unwrap();
        let outcome = desk.select_suggestion("alice", "Medals in 2018?").await.unwrap();
        assert_eq!(outcome.reply.text(), "12 medals.");

        let session = desk.session("alice");
        assert!(session.pending_suggestion().is_none());
        assert_eq!(session.history().len(), 4);
        assert_eq!(analyst.asked()[1].0, "Medals in 2018?");
    }

    #[tokio::test]
    async fn test_unoffered_suggestion_is_rejected() {
        let (mut desk, _storage, _dir) = desk(ScriptedAnalyst::new(Vec::new()));
        let err = desk.select_suggestion("alice", "made up").await.unwrap_err();
        assert!(matches!(kind(&err), Some(AnalystDeskError::Validation(_))));
    }

    #[test]
    fn test_bookmark_notices() {
        let (desk, storage, _dir) = desk(ScriptedAnalyst::new(Vec::new()));

        assert_eq!(
            desk.bookmark("alice", "How many medals?"),
            Notice::BookmarkSaved("How many medals?".into())
        );
        assert!(matches!(desk.bookmark("alice", " "), Notice::BookmarkFailed(_)));

        let saved = storage.recent_bookmarks(3, 10).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].language, "FR");
    }

    #[test]
    fn test_quick_questions_use_shared_bookmarks() {
        let (mut desk, _storage, _dir) = desk(ScriptedAnalyst::new(Vec::new()));
        desk.bookmark("bob", "Shared question");
        assert_eq!(desk.quick_questions("alice").unwrap(), vec!["Shared question"]);
    }

    #[test]
    fn test_end_session_starts_over() {
        let (mut desk, _storage, _dir) = desk(ScriptedAnalyst::new(Vec::new()));
        desk.select_model("alice", "AthletesModel").unwrap();
        desk.end_session("alice");
        assert_eq!(desk.session("alice").selected_model(), Some("WinterGameModel"));
    }

    /// Runner returning one fixed result and remembering the statements
    struct RecordingRunner {
        ran: Mutex<Vec<(String, StatementContext)>>,
    }

    #[async_trait]
    impl StatementRunner for RecordingRunner {
        async fn run(&self, statement: &str, context: &StatementContext) -> Result<ResultSet> {
            self.ran
                .lock()
                .unwrap()
                .push((statement.to_string(), context.clone()));
            Ok(ResultSet {
                columns: vec![Column {
                    name: "MEDALS".into(),
                    data_type: "fixed".into(),
                }],
                rows: vec![vec![Some("15".into())]],
                total_rows: 1,
                statement_handle: None,
            })
        }
    }

    #[tokio::test]
    async fn test_run_statement_of_latest_answer() {
        let analyst = ScriptedAnalyst::new(vec![Ok(vec![
            ContentBlock::text("This is our interpretation of your question."),
            ContentBlock::Sql {
                statement: "SELECT COUNT(*) AS medals FROM medals WHERE country = 'France'".into(),
            },
        ])]);
        let runner = Arc::new(RecordingRunner {
            ran: Mutex::new(Vec::new()),
        });
        let (desk, storage, _dir) = desk(analyst);
        let mut desk = desk.with_statement_runner(runner.clone());

        desk.submit_question("alice", "How many medals did France win?")
            .await
            .unwrap();
        let results = desk.run_statement("alice", 1).await.unwrap();

        assert_eq!(results.rows, vec![vec![Some("15".to_string())]]);
        let ran = runner.ran.lock().unwrap().clone();
        assert_eq!(ran.len(), 1);
        assert!(ran[0].0.starts_with("SELECT COUNT(*)"));
        assert_eq!(
            ran[0].1,
            StatementContext {
                database: "CORTEX_ANALYST_DEMO".into(),
                schema: "WINTER_GAME".into(),
            }
        );
        assert_eq!(desk.session("alice").history().len(), 2);
        assert_eq!(storage.log_count(3).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_run_statement_without_sql_or_runner() {
        let analyst = ScriptedAnalyst::new(vec![Ok(vec![ContentBlock::text("No query needed.")])]);
        let (mut desk, _storage, _dir) = desk(analyst);

        let err = desk.run_statement("alice", 1).await.unwrap_err();
        assert!(err.to_string().contains("not configured"));

        let mut desk = desk.with_statement_runner(Arc::new(RecordingRunner {
            ran: Mutex::new(Vec::new()),
        }));
        desk.submit_question("alice", "q").await.unwrap();
        let err = desk.run_statement("alice", 1).await.unwrap_err();
        assert!(matches!(kind(&err), Some(AnalystDeskError::Validation(_))));
    }
}
