//! Fraud heuristics evaluated per transaction, without batch context.

/// A named predicate over (amount, hour of day).
#[derive(Debug, Clone, Copy)]
pub struct HeuristicRule {
    pub name: &'static str,
    pub description: &'static str,
    predicate: fn(f64, u32) -> bool,
}

impl HeuristicRule {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        predicate: fn(f64, u32) -> bool,
    ) -> Self {
        Self {
            name,
            description,
            predicate,
        }
    }

    pub fn matches(&self, amount: f64, hour: u32) -> bool {
        (self.predicate)(amount, hour)
    }
}

fn night_large_transfer(amount: f64, hour: u32) -> bool {
    amount > 5000.0 && (1..=5).contains(&hour)
}

fn very_large_amount(amount: f64, _hour: u32) -> bool {
    amount > 7000.0
}

fn late_night_mid_amount(amount: f64, hour: u32) -> bool {
    amount > 4000.0 && (2..=4).contains(&hour)
}

/// The fixed heuristic set.
pub const STANDARD_RULES: [HeuristicRule; 3] = [
    HeuristicRule::new(
        "night_large_transfer",
        "amount above 5000 between 01:00 and 05:59",
        night_large_transfer,
    ),
    HeuristicRule::new(
        "very_large_amount",
        "amount above 7000 at any hour",
        very_large_amount,
    ),
    HeuristicRule::new(
        "late_night_mid_amount",
        "amount above 4000 between 02:00 and 04:59",
        late_night_mid_amount,
    ),
];

/// Rules combined by logical OR.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<HeuristicRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<HeuristicRule>) -> Self {
        Self { rules }
    }

    pub fn standard() -> Self {
        Self::new(STANDARD_RULES.to_vec())
    }

    pub fn rules(&self) -> &[HeuristicRule] {
        &self.rules
    }

    /// Names of every rule that matches, in rule order.
    pub fn matching(&self, amount: f64, hour: u32) -> Vec<&'static str> {
        self.rules
            .iter()
            .filter(|rule| rule.matches(amount, hour))
            .map(|rule| rule.name)
            .collect()
    }

    pub fn is_high_risk(&self, amount: f64, hour: u32) -> bool {
        self.rules.iter().any(|rule| rule.matches(amount, hour))
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}
