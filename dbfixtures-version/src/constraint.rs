use crate::error::ConstraintError;
use crate::semver::SemVer;
use std::fmt;
use std::str::FromStr;

const OPERATOR_CHARS: &[char] = &['<', '>', '=', '!', '~', '^'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Op {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "" | "=" => Some(Op::Eq),
            "!=" => Some(Op::Ne),
            ">" => Some(Op::Gt),
            ">=" => Some(Op::Ge),
            "<" => Some(Op::Lt),
            "<=" => Some(Op::Le),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Gt => ">",
            Op::Ge => ">=",
            Op::Lt => "<",
            Op::Le => "<=",
        }
    }

    fn holds(self, version: &SemVer, bound: &SemVer) -> bool {
        match self {
            Op::Eq => version == bound,
            Op::Ne => version != bound,
            Op::Gt => prerelease_in_range(version, bound) && version > bound,
            Op::Ge => prerelease_in_range(version, bound) && version >= bound,
            Op::Lt => prerelease_in_range(version, bound) && version < bound,
            Op::Le => prerelease_in_range(version, bound) && version <= bound,
        }
    }
}

/// Range operators only admit a pre-release version when the bound is a
/// pre-release of the same core version.
fn prerelease_in_range(version: &SemVer, bound: &SemVer) -> bool {
    match (version.is_prerelease(), bound.is_prerelease()) {
        (true, true) => version.same_core(bound),
        (true, false) => false,
        (false, _) => true,
    }
}

/// One `<op> <version>` term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub op: Op,
    pub bound: SemVer,
}

impl Clause {
    fn parse(clause: &str) -> Result<Self, ConstraintError> {
        let split = clause
            .find(|c: char| !OPERATOR_CHARS.contains(&c))
            .unwrap_or(clause.len());
        let (token, rest) = clause.split_at(split);

        let op = Op::from_token(token).ok_or_else(|| ConstraintError::UnknownOperator {
            clause: clause.to_string(),
            operator: token.to_string(),
        })?;
        let bound = SemVer::parse(rest).map_err(|source| ConstraintError::InvalidVersion {
            clause: clause.to_string(),
            source,
        })?;

        Ok(Self { op, bound })
    }

    pub fn check(&self, version: &SemVer) -> bool {
        self.op.holds(version, &self.bound)
    }
}

/// A conjunction of clauses separated by `,`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    clauses: Vec<Clause>,
}

impl Constraint {
    pub fn parse(input: &str) -> Result<Self, ConstraintError> {
        if input.trim().is_empty() {
            return Err(ConstraintError::Empty);
        }

        let clauses = input
            .split(',')
            .map(|raw| {
                let clause = raw.trim();
                if clause.is_empty() {
                    return Err(ConstraintError::EmptyClause {
                        input: input.to_string(),
                    });
                }
                Clause::parse(clause)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { clauses })
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn check(&self, version: &SemVer) -> bool {
        self.clauses.iter().all(|clause| clause.check(version))
    }
}

impl FromStr for Constraint {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Constraint::parse(s)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, clause) in self.clauses.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} {}", clause.op.as_str(), clause.bound)?;
        }
        Ok(())
    }
}
