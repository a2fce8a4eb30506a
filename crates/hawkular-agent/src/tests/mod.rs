//! Behavioural suites for the agent.
