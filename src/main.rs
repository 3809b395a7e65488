use kmedoids::clustering::config::Config;
use kmedoids::clustering::KMedoidsBuilder;
use kmedoids::visualization::print_cluster_analysis;
use log::info;

fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());
    let config = Config::from_file(&config_path).expect("Failed to load configuration");
    config.setup_logging();
    info!("{}", config);

    let data = config.load_data().expect("Failed to read data file");
    info!("Loaded {} points", data.len());

    let trainer = KMedoidsBuilder::from_shared(config.distance_metric::<f64>())
        .with_params(config.to_params())
        .build()
        .expect("Invalid clustering parameters");

    let result = trainer.run(&data).expect("Training failed");

    if let Some(selection) = &result.selection {
        println!("Model selection:");
        for (i, candidate) in selection.candidates.iter().enumerate() {
            let marker = if i == selection.best { "*" } else { " " };
            println!(
                "{} k={:<3} cost={:<12.6} mdl={:.3}",
                marker,
                candidate.k(),
                candidate.cost,
                candidate.mdl.total()
            );
        }
    }
    println!(
        "Trained k={} on {} sampled points: cost {:.6}, {} iterations ({:?})",
        result.model.k(),
        result.sample_size,
        result.cost,
        result.iterations,
        result.halt
    );

    print_cluster_analysis(&result.model, &data);
}
