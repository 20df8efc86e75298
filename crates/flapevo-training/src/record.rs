//! Per-epoch summaries and the log they are appended to.

use std::io;

use flapevo_controller::Controller;
use flapevo_stats::descriptive::{elementwise_mean, mean};

/// Summary of one evaluated generation. Written once, never updated.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRecord {
    /// Zero-based epoch index.
    pub epoch: usize,
    pub average_fitness: f32,
    pub average_weights: Vec<f32>,
    pub best_fitness: f32,
    pub best_weights: Vec<f32>,
    /// Mean fitness of the elite group (0 without elites).
    pub elite_fitness: f32,
    /// Mean weight vector of the elite group (zeros without elites).
    pub elite_weights: Vec<f32>,
}

impl GenerationRecord {
    /// Summarizes a ranked, evaluated population.
    ///
    /// # Panics
    ///
    /// Panics if the population is empty or `elite_count` exceeds its size.
    #[must_use]
    pub fn from_ranked(epoch: usize, ranked: &[Controller], elite_count: usize) -> Self {
        let best = ranked.first().expect("population must not be empty");
        let len = best.weights().len();
        let fitness = ranked.iter().map(Controller::fitness).collect::<Vec<_>>();
        let elites = &ranked[..elite_count];

        Self {
            epoch,
            average_fitness: mean(&fitness).unwrap_or_default(),
            average_weights: elementwise_mean(ranked.iter().map(Controller::weights), len),
            best_fitness: best.fitness(),
            best_weights: best.weights().to_vec(),
            elite_fitness: mean(&fitness[..elite_count]).unwrap_or_default(),
            elite_weights: elementwise_mean(elites.iter().map(Controller::weights), len),
        }
    }
}

/// Append-only sink for generation records.
pub trait GenerationLog {
    fn write_record(&mut self, record: &GenerationRecord) -> io::Result<()>;
}

impl GenerationLog for Vec<GenerationRecord> {
    fn write_record(&mut self, record: &GenerationRecord) -> io::Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

impl<L> GenerationLog for &mut L
where
    L: GenerationLog + ?Sized,
{
    fn write_record(&mut self, record: &GenerationRecord) -> io::Result<()> {
        (**self).write_record(record)
    }
}

#[cfg(test)]
mod tests {
    use flapevo_controller::Architecture;

    use super::*;

    fn constant(value: f32, fitness: f32) -> Controller {
        let arch = Architecture::new(6, 1).unwrap();
        Controller::from_weights(arch, vec![value; arch.total_weights()])
            .unwrap()
            .with_fitness(fitness)
    }

    #[test]
    fn test_record_summaries() {
        let ranked = [
            constant(1.0, 40.0),
            constant(2.0, 30.0),
            constant(3.0, 20.0),
            constant(6.0, 10.0),
        ];
        let record = GenerationRecord::from_ranked(3, &ranked, 2);
        assert_eq!(record.epoch, 3);
        assert_eq!(record.average_fitness, 25.0);
        assert_eq!(record.average_weights, vec![3.0; 9]);
        assert_eq!(record.best_fitness, 40.0);
        assert_eq!(record.best_weights, vec![1.0; 9]);
        assert_eq!(record.elite_fitness, 35.0);
        assert_eq!(record.elite_weights, vec![1.5; 9]);
    }

    #[test]
    fn test_record_without_elites() {
        let ranked = [constant(1.0, 4.0)];
        let record = GenerationRecord::from_ranked(0, &ranked, 0);
        assert_eq!(record.elite_fitness, 0.0);
        assert_eq!(record.elite_weights, vec![0.0; 9]);
    }

    fn write_twice<L>(mut log: L, record: &GenerationRecord)
    where
        L: GenerationLog,
    {
        log.write_record(record).unwrap();
        log.write_record(record).unwrap();
    }

    #[test]
    fn test_vec_log_appends() {
        let mut log: Vec<GenerationRecord> = Vec::new();
        let record = GenerationRecord::from_ranked(0, &[constant(1.0, 1.0)], 1);
        write_twice(&mut log, &record);
        assert_eq!(log, vec![record.clone(), record]);
    }
}
