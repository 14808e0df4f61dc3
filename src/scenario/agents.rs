//! Agents used by the scenarios.
//!
//! Every agent carries a provider-executed web search and a local company
//! lookup, so a single model turn can call both in parallel. The lookup
//! reports [`REPRO_FACTS`] for `repro` and [`RESUME_FACTS`] for the resume
//! agents.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::runtime::{AgentSpec, LocalTool, ToolParameters, ToolRegistry};

pub const WEB_SEARCH_TOOL: &str = "web_search_20250305";
pub const WEB_SEARCH_PROVIDER_ID: &str = "anthropic.web_search_20250305";
pub const WEB_SEARCH_MAX_USES: u32 = 3;
pub const COMPANY_INFO_TOOL: &str = "get_company_info";

const PARALLEL_INSTRUCTIONS: &str =
    "ALWAYS call BOTH web_search_20250305 AND get_company_info in parallel.";
const RESUME_INSTRUCTIONS: &str = "ALWAYS call BOTH web_search_20250305 AND get_company_info \
     in parallel on the first message. After getting results, write a brief response with \
     facts from the search.";
const FOLLOW_UP_INSTRUCTIONS: &str =
    "Answer the user's follow-up question using context from the conversation.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompanyInfoInput {
    company_name: String,
}

/// Output of `get_company_info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub name: String,
    pub founded: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hq: Option<String>,
}

/// Fixed facts `get_company_info` reports for whatever company it is asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompanyFacts {
    pub founded: u32,
    pub hq: Option<&'static str>,
}

/// Facts reported to the `repro` agent.
pub const REPRO_FACTS: CompanyFacts = CompanyFacts {
    founded: 2020,
    hq: None,
};

/// Facts reported to the resume agents.
pub const RESUME_FACTS: CompanyFacts = CompanyFacts {
    founded: 2021,
    hq: Some("San Francisco, CA"),
};

async fn company_info(input: CompanyInfoInput, facts: CompanyFacts) -> Result<CompanyInfo> {
    Ok(CompanyInfo {
        name: input.company_name,
        founded: facts.founded,
        hq: facts.hq.map(str::to_string),
    })
}

/// The local `get_company_info` tool, answering with `facts`.
pub fn company_info_tool(facts: CompanyFacts) -> LocalTool {
    LocalTool::new(
        COMPANY_INFO_TOOL,
        "Get basic info about a company",
        ToolParameters::object()
            .string("companyName", "Company name", true)
            .build(),
        move |args| async move {
            let info = company_info(args.deserialize()?, facts).await?;
            Ok(serde_json::to_value(info)?)
        },
    )
}

/// Web search (provider-executed) plus `get_company_info` (local).
pub fn parallel_tools(facts: CompanyFacts) -> ToolRegistry {
    ToolRegistry::new()
        .with_provider_tool(
            WEB_SEARCH_TOOL,
            WEB_SEARCH_PROVIDER_ID,
            Some(WEB_SEARCH_MAX_USES),
        )
        .with_local(company_info_tool(facts))
}

fn agent(id: &str, model: &str, instructions: &str, facts: CompanyFacts) -> AgentSpec {
    AgentSpec::builder()
        .id(id)
        .name(id)
        .model(model)
        .instructions(instructions)
        .tools(parallel_tools(facts))
        .build()
}

/// Agent for the single-turn stream checks.
pub fn repro(model: &str) -> AgentSpec {
    agent("repro", model, PARALLEL_INSTRUCTIONS, REPRO_FACTS)
}

/// First-turn agent of the resume scenario.
pub fn resume_test(model: &str) -> AgentSpec {
    agent("resume-test", model, RESUME_INSTRUCTIONS, RESUME_FACTS)
}

/// Fresh agent that receives the replayed history plus the follow-up.
pub fn resume_follow_up(model: &str) -> AgentSpec {
    agent("resume-test-2", model, FOLLOW_UP_INSTRUCTIONS, RESUME_FACTS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{Tool, ToolArguments, ToolSpec};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn company_info_returns_fixed_facts() {
        let out = company_info_tool(RESUME_FACTS)
            .execute(&ToolArguments::new(json!({"companyName": "Anthropic"})))
            .await
            .unwrap();
        assert_eq!(
            out,
            json!({"name": "Anthropic", "founded": 2021, "hq": "San Francisco, CA"})
        );
    }

    #[tokio::test]
    async fn repro_company_info_omits_headquarters() {
        let args = ToolArguments::new(json!({"companyName": "Anthropic"}));
        let out = repro("m")
            .tools
            .execute_local(COMPANY_INFO_TOOL, &args)
            .await
            .unwrap();
        assert_eq!(out, json!({"name": "Anthropic", "founded": 2020}));
    }

    #[tokio::test]
    async fn company_info_rejects_missing_name() {
        let err = company_info_tool(REPRO_FACTS)
            .execute(&ToolArguments::new(json!({"company": "Anthropic"})))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid tool arguments"));
    }

    #[test]
    fn agents_share_parallel_tool_set() {
        for spec in [repro("m"), resume_test("m"), resume_follow_up("m")] {
            assert!(spec.tools.is_provider_executed(WEB_SEARCH_TOOL));
            assert!(matches!(
                spec.tools.get(COMPANY_INFO_TOOL),
                Some(ToolSpec::Local(_))
            ));
        }
        assert_eq!(resume_follow_up("m").id, "resume-test-2");
    }
}
