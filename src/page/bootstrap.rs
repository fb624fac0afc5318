//! Bootstrap sequencing.
//!
//! ```text
//! start() ── force renderer ─────────────▶ RendererConfigured   (synchronous)
//!    └─ spawn pipeline
//!         wait for Interactive ──────────▶ DomReadyWait
//!         sweep media + arm observer ────▶ ImagesSwept, Watching
//!         ├─ watcher loop                  (until unload)
//!         └─ settle delay, sweep links ──▶ TablesSwept
//! ```

use std::rc::Rc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::{ConfigError, Settings};
use crate::core::Phase;
use crate::dom::{MutationObserver, SharedDocument};
use crate::inline::TableInliner;
use crate::typeset::{RendererSwitch, force_renderer};
use crate::watch::{NodeHandler, Reconciler, Watcher, sweep_media, sweep_table_links};

use super::{Page, ReadyState, Services};

/// Attaches the enhancer to pages
pub struct Bootstrapper {
    settings: Settings,
    services: Services,
}

impl Bootstrapper {
    pub fn new(settings: Settings, services: Services) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self { settings, services })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Configure the renderer now and start the image/table pipeline.
    ///
    /// Must be called inside a tokio `LocalSet`.
    pub fn start(&self, page: &Page) -> Session {
        if self.settings.verbose {
            crate::logger::set_verbose(true);
        }

        let (phase_tx, phase) = watch::channel(Phase::NotStarted);

        let renderer = force_renderer(
            &self.settings.renderer,
            &self.services.math,
            self.services.cookies.as_ref(),
            &self.settings,
        );
        advance(&phase_tx, Phase::RendererConfigured);

        let inliner = Rc::new(TableInliner::new(
            page.document().clone(),
            self.services.fetcher.clone(),
            page.url().cloned(),
        ));

        let pipeline = tokio::task::spawn_local(run_pipeline(Pipeline {
            doc: page.document().clone(),
            ready: page.subscribe(),
            inliner: inliner.clone(),
            phase: phase_tx,
            settings: self.settings.clone(),
        }));

        Session {
            doc: page.document().clone(),
            phase,
            inliner,
            renderer,
            pipeline,
        }
    }
}

/// Enhancer attached to one page view
pub struct Session {
    doc: SharedDocument,
    phase: watch::Receiver<Phase>,
    inliner: Rc<TableInliner>,
    renderer: RendererSwitch,
    pipeline: JoinHandle<()>,
}

impl Session {
    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Wait until `phase` is reached. False if the pipeline stopped first.
    pub async fn reached(&self, phase: Phase) -> bool {
        let mut rx = self.phase.clone();
        rx.wait_for(|current| *current >= phase).await.is_ok()
    }

    pub fn inliner(&self) -> &Rc<TableInliner> {
        &self.inliner
    }

    pub fn renderer(&self) -> &RendererSwitch {
        &self.renderer
    }

    /// Stop watching and drop pending timers. Fetches already in flight are
    /// left to finish on their own.
    pub fn unload(self) {
        self.pipeline.abort();
        if let Some(live) = &self.renderer.live {
            live.abort();
        }
        self.doc.disconnect_observer();
        crate::debug!("page"; "session unloaded at {}", self.phase());
    }
}

struct Pipeline {
    doc: SharedDocument,
    ready: watch::Receiver<ReadyState>,
    inliner: Rc<TableInliner>,
    phase: watch::Sender<Phase>,
    settings: Settings,
}

fn advance(phase: &watch::Sender<Phase>, next: Phase) {
    phase.send_replace(next);
    crate::debug!("page"; "phase {}", next);
}

async fn run_pipeline(mut p: Pipeline) {
    advance(&p.phase, Phase::DomReadyWait);
    if *p.ready.borrow() == ReadyState::Loading {
        crate::debug!("page"; "document still loading, waiting for it to become interactive");
    }
    if p.ready.wait_for(|s| *s >= ReadyState::Interactive).await.is_err() {
        crate::warn!("page"; "page closed before becoming interactive");
        return;
    }

    let handler: Rc<dyn NodeHandler> = Rc::new(Reconciler::new(p.inliner.clone()));

    // Same turn: nothing can be inserted between the sweep and arming.
    sweep_media(&p.doc, handler.as_ref());
    let observer = MutationObserver::observe(&p.doc, p.doc.body());
    advance(&p.phase, Phase::ImagesSwept);
    advance(&p.phase, Phase::Watching);
    crate::log!("page"; "enhancer active");

    let watcher = Watcher::new(observer, handler.clone());
    let tables = async {
        tokio::time::sleep(p.settings.table_settle()).await;
        sweep_table_links(&p.doc, handler.as_ref());
        advance(&p.phase, Phase::TablesSwept);
    };

    tokio::join!(watcher.run(), tables);
}
