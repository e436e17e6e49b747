use crate::command::{Command, HELP};
use crate::render;
use fruitscan::catalog::Catalog;
use fruitscan::model::ModelLoader;
use fruitscan::{ImageInput, InputSource, Session, SessionPhase};
use std::ops::ControlFlow;
use std::path::Path;

/// Presentation layer: owns the session and prints what it produces
pub struct App {
    session: Session,
    loader: ModelLoader,
    catalog: Catalog,
    announced_model: bool,
}

impl App {
    pub fn new(loader: ModelLoader, catalog: Catalog) -> Self {
        Self {
            session: Session::new(),
            loader,
            catalog,
            announced_model: false,
        }
    }

    pub async fn handle(&mut self, command: Command) -> ControlFlow<()> {
        match command {
            Command::Submit { path, source } => {
                self.submit(&path, source).await;
            }
            Command::Show => {
                self.show().await;
            }
            Command::Retry => {
                self.loader.reset().await;
                self.show().await;
            }
            Command::Clear => {
                self.session.clear();
                println!("Cleared.");
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Reads, submits and classifies `path`. `false` when no result could be shown.
    pub async fn submit(&mut self, path: &Path, source: InputSource) -> bool {
        match ImageInput::from_path(path, source).await {
            Ok(image) => {
                self.session.submit(image);
                self.show().await
            }
            Err(err) => {
                println!("{}", render::error(&err));
                false
            }
        }
    }

    pub async fn show(&mut self) -> bool {
        if self.session.phase() == SessionPhase::NoImage {
            println!("No image yet. Use `upload <path>` or `camera <path>`.");
            return false;
        }

        let rendered = self.session.render(&self.loader, &self.catalog).await;
        if !self.announced_model {
            if let Some(location) = self.loader.location().await {
                println!("{}", render::provenance(&location));
                self.announced_model = true;
            }
        }
        match rendered {
            Ok(Some(result)) => {
                println!("{}", render::result(result));
                true
            }
            Ok(None) => false,
            Err(err) => {
                println!("{}", render::error(&err));
                false
            }
        }
    }
}
