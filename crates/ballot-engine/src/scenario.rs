use ballot_core::{FieldPath, ProposalName, StructuredIssue};
use ballot_evm::LocalPrivateKeySigner;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const ISSUE_KIND: &str = "scenario_invalid";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    /// Deploys the contract and acts as its chairperson.
    Owner,
    Voter,
}

impl AccountRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Voter => "voter",
        }
    }
}

/// The two signing accounts a scenario plays with.
#[derive(Debug, Clone)]
pub struct ScenarioAccounts {
    pub owner: LocalPrivateKeySigner,
    pub voter: LocalPrivateKeySigner,
}

impl ScenarioAccounts {
    pub fn new(owner: LocalPrivateKeySigner, voter: LocalPrivateKeySigner) -> Self {
        Self { owner, voter }
    }

    pub fn signer(&self, role: AccountRole) -> &LocalPrivateKeySigner {
        match role {
            AccountRole::Owner => &self.owner,
            AccountRole::Voter => &self.voter,
        }
    }

    pub fn address(&self, role: AccountRole) -> Address {
        self.signer(role).address()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScenarioStep {
    Deploy {
        proposals: Vec<ProposalName>,
    },
    GiveRightToVote {
        voter: AccountRole,
    },
    Delegate {
        from: AccountRole,
        to: AccountRole,
    },
    Fund {
        from: AccountRole,
        to: AccountRole,
        amount: U256,
    },
    /// Waits until `account` can spend what was sent to it.
    Receive {
        account: AccountRole,
        min_balance: U256,
    },
    Vote {
        voter: AccountRole,
        proposal: u64,
    },
    QueryWinner {
        from: AccountRole,
    },
}

impl ScenarioStep {
    pub fn id(&self) -> &'static str {
        match self {
            Self::Deploy { .. } => "deploy",
            Self::GiveRightToVote { .. } => "give_right_to_vote",
            Self::Delegate { .. } => "delegate",
            Self::Fund { .. } => "fund",
            Self::Receive { .. } => "receive",
            Self::Vote { .. } => "vote",
            Self::QueryWinner { .. } => "query_winner",
        }
    }

    pub fn needs_contract(&self) -> bool {
        matches!(
            self,
            Self::GiveRightToVote { .. }
                | Self::Delegate { .. }
                | Self::Vote { .. }
                | Self::QueryWinner { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScenarioPlan {
    pub steps: Vec<ScenarioStep>,
}

impl ScenarioPlan {
    pub fn new(steps: Vec<ScenarioStep>) -> Self {
        Self { steps }
    }

    /// compile → deploy → give right to vote → delegate → fund → receive → vote → query winner.
    pub fn ballot_demo(proposals: Vec<ProposalName>, fund_amount: U256, vote_proposal: u64) -> Self {
        Self::new(vec![
            ScenarioStep::Deploy { proposals },
            ScenarioStep::GiveRightToVote {
                voter: AccountRole::Voter,
            },
            ScenarioStep::Delegate {
                from: AccountRole::Owner,
                to: AccountRole::Voter,
            },
            ScenarioStep::Fund {
                from: AccountRole::Owner,
                to: AccountRole::Voter,
                amount: fund_amount,
            },
            ScenarioStep::Receive {
                account: AccountRole::Voter,
                min_balance: fund_amount,
            },
            ScenarioStep::Vote {
                voter: AccountRole::Voter,
                proposal: vote_proposal,
            },
            ScenarioStep::QueryWinner {
                from: AccountRole::Owner,
            },
        ])
    }

    pub fn proposals(&self) -> &[ProposalName] {
        self.steps
            .iter()
            .find_map(|step| match step {
                ScenarioStep::Deploy { proposals } => Some(proposals.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }
}

pub fn validate_scenario(plan: &ScenarioPlan) -> Vec<StructuredIssue> {
    let mut issues = Vec::new();
    let steps_path = FieldPath::root().key("steps");

    if plan.steps.is_empty() {
        issues.push(issue(steps_path, "scenario has no steps"));
        return issues;
    }
    if !matches!(plan.steps.first(), Some(ScenarioStep::Deploy { .. })) {
        issues.push(issue(
            steps_path.clone().index(0),
            "first step must deploy the contract",
        ));
    }

    let proposal_count = plan.proposals().len();
    let mut deployed = false;
    let mut seen_ids = BTreeSet::new();
    for (index, step) in plan.steps.iter().enumerate() {
        let path = steps_path.clone().index(index);
        if !seen_ids.insert(step.id()) {
            issues.push(issue(
                path.clone(),
                format!("duplicate step `{}`", step.id()),
            ));
        }
        if step.needs_contract() && !deployed {
            issues.push(issue(
                path.clone(),
                format!("step `{}` runs before the contract is deployed", step.id()),
            ));
        }
        match step {
            ScenarioStep::Deploy { proposals } => {
                if deployed {
                    issues.push(issue(path.clone(), "contract is deployed more than once"));
                }
                if proposals.is_empty() {
                    issues.push(issue(
                        path.key("proposals"),
                        "at least one proposal is required",
                    ));
                }
                deployed = true;
            }
            ScenarioStep::Delegate { from, to } if from == to => {
                issues.push(issue(
                    path.key("to"),
                    format!("{} cannot delegate to itself", from.as_str()),
                ));
            }
            ScenarioStep::Fund { from, to, amount } => {
                if amount.is_zero() {
                    issues.push(issue(path.clone().key("amount"), "fund amount must be > 0"));
                }
                if from == to {
                    issues.push(issue(
                        path.key("to"),
                        format!("{} cannot fund itself", from.as_str()),
                    ));
                }
            }
            ScenarioStep::Vote { proposal, .. } if *proposal as usize >= proposal_count => {
                issues.push(issue(
                    path.key("proposal"),
                    format!(
                        "proposal index {proposal} out of range for {proposal_count} proposal(s)"
                    ),
                ));
            }
            _ => {}
        }
    }

    StructuredIssue::sort_stable(&mut issues);
    issues
}

fn issue(field_path: FieldPath, message: impl Into<String>) -> StructuredIssue {
    StructuredIssue::error(ISSUE_KIND, "scenario", field_path, message)
}

#[cfg(test)]
#[path = "scenario_test.rs"]
mod tests;
