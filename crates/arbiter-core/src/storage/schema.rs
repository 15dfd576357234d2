pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS log_entries (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  filepath TEXT NOT NULL,
  agent_name TEXT,
  provider TEXT,
  model TEXT,
  user_prompt TEXT,
  instructions TEXT,
  tool_calls TEXT,
  total_input_tokens INTEGER,
  total_output_tokens INTEGER,
  assistant_answer TEXT,
  raw_transcript TEXT
);

CREATE TABLE IF NOT EXISTS check_results (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  log_id INTEGER NOT NULL REFERENCES log_entries(id) ON DELETE CASCADE,
  check_name TEXT NOT NULL,
  passed INTEGER,
  details TEXT,
  created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_log_entries_filepath ON log_entries(filepath);
CREATE INDEX IF NOT EXISTS idx_check_results_log_id ON check_results(log_id);
"#;
