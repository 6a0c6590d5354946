/// Marking agent colorant, per PWG 5100.13 `marker-colors`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Colorant {
    Black,
    Cyan,
    Magenta,
    Yellow,
    Other,
}

impl Colorant {
    pub fn keyword(self) -> &'static str {
        match self {
            Colorant::Black => "black",
            Colorant::Cyan => "cyan",
            Colorant::Magenta => "magenta",
            Colorant::Yellow => "yellow",
            Colorant::Other => "no-color",
        }
    }
}

/// `marker-type`, per PWG 5100.13.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupplyKind {
    Toner,
    Ink,
    Staples,
    Waste,
}

impl SupplyKind {
    pub fn keyword(self) -> &'static str {
        match self {
            SupplyKind::Toner => "toner",
            SupplyKind::Ink => "ink",
            SupplyKind::Staples => "staples",
            SupplyKind::Waste => "waste-toner",
        }
    }
}

/// One entry of `printer-supply` / `printer-supply-description`.
#[derive(Debug, Clone)]
pub struct Supply {
    pub colorant: Colorant,
    pub kind: SupplyKind,
    pub description: String,
    /// Percent full, 0..=100. A waste receptacle reports percent used.
    pub level: i32,
    /// Set once a supply has been used up and replaced is required; distinct
    /// from `level == 0`, which a never-installed slot also reports.
    pub is_consumed: bool,
}

impl Supply {
    pub fn is_low(&self) -> bool {
        self.level >= 0 && self.level <= 5
    }

    pub fn is_empty(&self) -> bool {
        self.level == 0
    }

    /// The `printer-supply` string-with-language-free encoding PWG 5100.13
    /// uses: `type=<kind>;maxcapacity=100;level=<n>;colorantname=<colorant>;`.
    pub fn encode(&self) -> String {
        format!(
            "type={};maxcapacity=100;level={};colorantname={};",
            self.kind.keyword(),
            self.level,
            self.colorant.keyword(),
        )
    }
}
