//! Built-in default rule set.
//!
//! Used as the local tier when no rule file is configured, so the
//! classifier gives useful answers out of the box. The shipped
//! `patterns.json` carries the same rules plus validator metadata;
//! a test keeps the two in sync.

use crate::patterns::{ErrorPattern, PatternSet, Severity};

fn rule(
    id: &str,
    category: &str,
    pattern: &str,
    root_cause: &str,
    suggestion: &str,
    severity: Severity,
    tags: &[&str],
) -> ErrorPattern {
    ErrorPattern {
        id: id.to_string(),
        category: category.to_string(),
        pattern: pattern.to_string(),
        flags: "i".to_string(),
        root_cause: root_cause.to_string(),
        suggestion: suggestion.to_string(),
        severity,
        priority: None,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        tests: None,
    }
}

/// The default rules, in match order. Specific failures come first,
/// the generic error backstop last.
pub fn builtin_patterns() -> Vec<ErrorPattern> {
    vec![
        rule(
            "docker-auth",
            "Docker",
            r"unauthorized.*registry|denied.*requested access|authentication required",
            "Docker registry authentication failed",
            "Check your `DOCKER_USERNAME` and `DOCKER_PASSWORD` secrets are set correctly in repository settings (Settings → Secrets → Actions)",
            Severity::Critical,
            &["docker", "registry", "auth"],
        ),
        rule(
            "docker-manifest-missing",
            "Docker",
            r"manifest.*not found|pull access denied|repository does not exist",
            "Docker image or tag not found in registry",
            "Verify the image name and tag exist in your registry. Check for typos in your image reference.",
            Severity::Critical,
            &["docker", "registry"],
        ),
        rule(
            "dockerfile-missing",
            "Docker",
            r"dockerfile.*not found|cannot find.*dockerfile",
            "Dockerfile not found at specified path",
            "Check the `file` or `context` path in your docker build step. Make sure the Dockerfile exists at that location.",
            Severity::Critical,
            &["docker", "build"],
        ),
        rule(
            "disk-space",
            "CI Platform",
            r"no space left on device",
            "Runner ran out of disk space",
            "Add a disk cleanup step before your build: use `docker system prune -f` or the `jlumbroso/free-disk-space` action.",
            Severity::Critical,
            &["runner", "disk"],
        ),
        rule(
            "missing-secret",
            "CI Platform",
            r"secret.*not.*set|secrets\.(\w+).*undefined|Input required and not supplied",
            "A required secret or input is missing",
            "Go to Settings → Secrets → Actions and add the missing secret. Check the action's documentation for required inputs.",
            Severity::Critical,
            &["secrets", "configuration"],
        ),
        rule(
            "token-permissions",
            "CI Platform",
            r"resource not accessible by integration|403.*github",
            "GitHub token lacks required permissions",
            "Add the required permissions to your workflow. Example: `permissions: contents: write` or use a Personal Access Token with broader scopes.",
            Severity::Critical,
            &["permissions", "token"],
        ),
        rule(
            "step-timeout",
            "CI Platform",
            r"timeout|timed out after",
            "A step exceeded its timeout limit",
            "Increase the `timeout-minutes` for the step or job. Consider caching dependencies to speed up the pipeline.",
            Severity::Warning,
            &["timeout", "performance"],
        ),
        rule(
            "npm-peer-deps",
            "Node.js",
            r"npm ERR!.*peer dep|ERESOLVE",
            "npm dependency conflict detected",
            "Try adding `--legacy-peer-deps` flag to your npm install command, or update conflicting packages.",
            Severity::Critical,
            &["npm", "dependencies"],
        ),
        rule(
            "node-module-missing",
            "Node.js",
            r"cannot find module|module not found",
            "A required Node.js module is missing",
            "Run `npm install` before your build step, or check that all dependencies are listed in `package.json`.",
            Severity::Critical,
            &["npm", "dependencies"],
        ),
        rule(
            "npm-permissions",
            "Node.js",
            r"EACCES.*permission denied|EPERM",
            "File permission error during npm install",
            "Avoid running npm with sudo. Check if you need to set `NODE_PATH` or use a specific Node.js version via `actions/setup-node`.",
            Severity::Critical,
            &["npm", "permissions"],
        ),
        rule(
            "test-failures",
            "Tests",
            r"(\d+) (test|spec|suite)s? failed|FAIL.*\.test\.|Tests Failed",
            "One or more tests failed",
            "Check the test output above for specific failing test names. Run the tests locally with the same environment variables to reproduce.",
            Severity::Critical,
            &["tests"],
        ),
        rule(
            "typescript-errors",
            "Build",
            r"TypeScript.*error|TS\d{4}:",
            "TypeScript compilation error",
            "Fix the TypeScript errors shown above. Run `tsc --noEmit` locally to see all errors before pushing.",
            Severity::Critical,
            &["typescript", "build"],
        ),
        rule(
            "syntax-error",
            "Build",
            r"syntax error|SyntaxError",
            "Syntax error in code",
            "Check the file and line number shown above for syntax errors. Run a linter locally to catch these before pushing.",
            Severity::Critical,
            &["build", "lint"],
        ),
        rule(
            "connection-refused",
            "Network",
            r"connection refused|ECONNREFUSED|network.*unreachable",
            "Network connection failed",
            "Check if the target service is running and accessible. For external services, verify the URL and port. Consider adding retry logic.",
            Severity::Critical,
            &["network"],
        ),
        rule(
            "rate-limit",
            "Network",
            r"rate limit.*exceeded|API rate limit",
            "API rate limit exceeded",
            "You've hit GitHub's API rate limit. Use `GITHUB_TOKEN` for authenticated requests (higher limits) or add delays between API calls.",
            Severity::Warning,
            &["network", "api"],
        ),
        rule(
            "image-pull-backoff",
            "Kubernetes",
            r"imagepullbackoff|errimagepull",
            "Kubernetes cannot pull the Docker image",
            "Check the image name and tag. If using a private registry, ensure the imagePullSecret is configured correctly in your cluster.",
            Severity::Critical,
            &["kubernetes", "docker"],
        ),
        rule(
            "helm-failure",
            "Kubernetes",
            r"helm.*failed|Error: UPGRADE FAILED",
            "Helm chart deployment failed",
            "Run `helm status <release-name>` and `kubectl describe pod` to get more details. Check if there are resource conflicts.",
            Severity::Critical,
            &["kubernetes", "helm"],
        ),
        rule(
            "generic-error",
            "Generic",
            r"error|failed|fatal",
            "An error occurred during pipeline execution",
            "Review the highlighted error lines above for details. Check the step's documentation for common issues.",
            Severity::Warning,
            &["generic"],
        ),
    ]
}

impl PatternSet {
    /// The built-in rules as a ready-to-match set.
    pub fn builtin() -> Self {
        Self::new(builtin_patterns())
    }
}
