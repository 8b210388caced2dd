use color_eyre::eyre::{self, ensure};
use kata_core::summation::SummationEvaluator;

#[derive(clap::Args, Debug)]
pub(crate) struct Sum {
    /// Upper bound of the sum, drawn at random from 1..=100 when omitted
    #[arg(long, allow_negative_numbers = true)]
    pub n: Option<i64>,
}

impl Sum {
    pub(crate) fn run(&self) -> eyre::Result<()> {
        let mut evaluator = SummationEvaluator::default();
        match self.n {
            Some(n) => evaluator = SummationEvaluator::new(n),
            None => {
                evaluator.regenerate(&mut rand::rng());
            }
        }

        let sums = evaluator.results();
        ensure!(sums.agree(), "summation strategies disagree for n={}: {sums:?}", evaluator.n());

        println!("n = {}", evaluator.n());
        println!("{sums}");

        Ok(())
    }
}
