use log::info;
use training_curves::{history::TrainingHistory, render};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let history = TrainingHistory::recorded();
    info!("rendering {} epochs to {}", history.n_epochs(), render::OUTPUT_PATH);
    render::render_to_file(&history, &render::Style::default(),
                           render::OUTPUT_PATH)?;
    Ok(())
}
