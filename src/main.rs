//! Starter select - pick up to three starters within a ten-point budget

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::Terminal;
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventOutcome, RenderContext, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem};

use starter_select::action::Action;
use starter_select::audio;
use starter_select::effect::Effect;
use starter_select::persist::{self, DataError};
use starter_select::reducer::reducer;
use starter_select::sprite;
use starter_select::state::{AppState, TICK_MS, VALUE_REVERT_MS};
use starter_select::ui;

const SPRITE_TASK: &str = "species_sprite";
const VALUE_REVERT_TASK: &str = "value_revert";

#[derive(Parser, Debug)]
#[command(name = "starter-select")]
#[command(about = "Choose up to three starters within a ten-point budget")]
struct Args {
    #[command(flatten)]
    debug: DebugCliArgs,
    /// Species catalog (RON); the built-in catalog is used when omitted
    #[arg(long)]
    species: Option<PathBuf>,
    /// Save data (RON); a demo save is used when omitted
    #[arg(long)]
    save: Option<PathBuf>,
    /// Directory holding sprites/ and cries/
    #[arg(long, default_value = "assets")]
    assets: PathBuf,
    /// Where the chosen party is written as JSON
    #[arg(long)]
    output: Option<PathBuf>,
    /// Base seed for the daily bonus markers
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// UTC day for the bonus markers (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Disable sound
    #[arg(long)]
    mute: bool,
}

#[derive(Clone, Debug)]
struct RuntimeConfig {
    species: Option<PathBuf>,
    save: Option<PathBuf>,
    assets: PathBuf,
    output: PathBuf,
    seed: u64,
    day: NaiveDate,
    mute: bool,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    let debug = DebugSession::new(args.debug);
    debug.save_state_schema::<AppState>().map_err(debug_error)?;
    debug.save_actions_schema::<Action>().map_err(debug_error)?;

    let config = RuntimeConfig {
        species: args.species,
        save: args.save,
        assets: args.assets,
        output: args.output.unwrap_or_else(persist::default_output_path),
        seed: args.seed,
        day: args.date.unwrap_or_else(|| Utc::now().date_naive()),
        mute: args.mute,
    };

    let state = debug
        .load_state_or_else_async(|| {
            let config = config.clone();
            async move {
                let catalog = persist::load_catalog(config.species.as_deref())
                    .await
                    .map_err(data_error)?;
                let save = persist::load_save(config.save.as_deref())
                    .await
                    .map_err(data_error)?;
                Ok::<AppState, io::Error>(AppState::new(catalog, save, config.seed, config.day))
            }
        })
        .await
        .map_err(debug_error)?;

    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions, config).await;

    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug.save_actions(recorder.as_ref()).map_err(debug_error)?;
    Ok(())
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

fn data_error(error: DataError) -> io::Error {
    io::Error::other(error.to_string())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
    config: RuntimeConfig,
) -> io::Result<DebugRunOutput<AppState>> {
    let config = Arc::new(config);
    debug
        .run_effect_app(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }
                runtime
                    .subscriptions()
                    .interval("tick", Duration::from_millis(TICK_MS), || Action::Tick);
            },
            |frame, area, state, render_ctx: RenderContext| {
                ui::render(frame, area, state, render_ctx);
            },
            |event, state| -> EventOutcome<Action> { ui::handle_event(event, state) },
            |action| matches!(action, Action::Quit | Action::RunDidStart),
            move |effect, ctx| handle_effect(effect, ctx, config.clone()),
        )
        .await
}

fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>, config: Arc<RuntimeConfig>) {
    match effect {
        Effect::LoadSprite(request) => {
            let assets = config.assets.clone();
            ctx.tasks().spawn(TaskKey::new(SPRITE_TASK), async move {
                let token = request.token;
                match sprite::load_sprite(&request, &assets).await {
                    Ok(sprite) => Action::SpriteDidLoad { token, sprite },
                    Err(error) => Action::SpriteDidError { token, error },
                }
            });
        }
        Effect::CancelSpriteLoad => {
            ctx.tasks().cancel(&TaskKey::new(SPRITE_TASK));
        }
        Effect::PlayCue(cue) => {
            if !config.mute {
                audio::play_cue(cue);
            }
        }
        Effect::PlayCry { species_id } => {
            if !config.mute {
                let path = config.assets.join("cries").join(format!("{species_id}.ogg"));
                audio::play_cry(path);
            }
        }
        Effect::ScheduleValueRevert => {
            ctx.tasks().debounce(
                VALUE_REVERT_TASK,
                Duration::from_millis(VALUE_REVERT_MS),
                async { Action::ValueRevert },
            );
        }
        Effect::CancelValueRevert => {
            ctx.tasks().cancel(&TaskKey::new(VALUE_REVERT_TASK));
        }
        Effect::StartRun(run) => {
            let output = config.output.clone();
            ctx.tasks().spawn(TaskKey::new("run_start"), async move {
                match persist::write_run_start(&output, &run).await {
                    Ok(()) => Action::RunDidStart,
                    Err(err) => Action::RunStartError(err.to_string()),
                }
            });
        }
    }
}
