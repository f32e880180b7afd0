//! Load a data directory and print what the dashboard would show.
//!
//! cargo run -p borderhub-core --example explore -- ./data

use std::sync::Arc;

use borderhub_core::{Aggregation, BorderSelection, Datasets, Decay, ResultExplorer, View};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = std::env::args().nth(1).unwrap_or_else(|| "data".to_string());

    // 1. Parse the result files once
    let data = Datasets::load(std::path::Path::new(&dir))?;
    let explorer = ResultExplorer::new(Arc::new(data));

    // 2. Selection controls
    let options = explorer.options();
    println!("Borders: {}", options.borders.join(", "));
    println!("Years:   {:?}", options.years);

    // 3. Long-form MPI for every border
    if let View::Ready { data } = explorer.mpi_long(&BorderSelection::All) {
        for d in data.iter().filter(|d| d.decay == Decay::D003.label()) {
            println!("{:<20} {:?}", d.border, d.value);
        }
    }

    // 4. CI heatmap matrix
    let matrix = explorer.ci_matrix(Aggregation::Sum)?;
    println!("CI matrix: {} borders x {} years", matrix.rows.len(), matrix.columns.len());

    Ok(())
}
